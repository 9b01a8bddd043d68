// [libs/infra/cache/src/usage_counters.rs]
/*!
 * APARATO: USAGE COUNTERS (HOT PATH)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: INCREMENTO ATÓMICO DE CONTADORES DE USO (§4.2.2)
 *
 * Claves `usage:{tenantId}:{YYYY-MM-DD}` y la variante por proyecto,
 * ambas hash con TTL de 90 días. El Gateway escribe en el hot path en
 * cada respuesta; la agregación duradera vive en `UsageRepository`.
 */

use crate::errors::CacheError;
use crate::CachePool;
use chrono::{NaiveDate, Timelike, Utc};
use redis::AsyncCommands;
use tracing::instrument;
use uuid::Uuid;

const DEFAULT_USAGE_RETENTION_DAYS: i64 = 90;

pub struct UsageCounters {
    pool: CachePool,
    ttl_seconds: i64,
}

impl UsageCounters {
    pub fn new(pool: CachePool) -> Self {
        Self::with_retention(pool, DEFAULT_USAGE_RETENTION_DAYS)
    }

    /// `retention_days` acota §10.3's `USAGE_RETENTION_DAYS` (90 por defecto).
    pub fn with_retention(pool: CachePool, retention_days: i64) -> Self {
        Self { pool, ttl_seconds: retention_days * 86_400 }
    }

    fn tenant_key(tenant_id: Uuid, date: NaiveDate) -> String {
        format!("usage:{}:{}", tenant_id, date.format("%Y-%m-%d"))
    }

    fn project_key(tenant_id: Uuid, project_id: Uuid, date: NaiveDate) -> String {
        format!("usage:{}:{}:{}", tenant_id, project_id, date.format("%Y-%m-%d"))
    }

    /// Incrementa `requests` y `hour:{HH}` de forma pipelinada, tanto
    /// en la clave global del tenant como en la de su proyecto.
    #[instrument(skip(self))]
    pub async fn record_request(&self, tenant_id: Uuid, project_id: Uuid) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now();
        let date = now.date_naive();
        let hour_field = format!("hour:{:02}", now.hour());

        let tenant_key = Self::tenant_key(tenant_id, date);
        let project_key = Self::project_key(tenant_id, project_id, date);

        redis::pipe()
            .atomic()
            .hincr(&tenant_key, "requests", 1)
            .hincr(&tenant_key, &hour_field, 1)
            .expire(&tenant_key, self.ttl_seconds)
            .hincr(&project_key, "requests", 1)
            .hincr(&project_key, &hour_field, 1)
            .expire(&project_key, self.ttl_seconds)
            .query_async::<()>(&mut conn)
            .await
            .map_err(CacheError::from)
    }

    #[instrument(skip(self))]
    pub async fn requests_today(&self, tenant_id: Uuid) -> Result<u64, CacheError> {
        let mut conn = self.pool.get().await?;
        let key = Self::tenant_key(tenant_id, Utc::now().date_naive());
        let count: Option<u64> = conn.hget(&key, "requests").await?;
        Ok(count.unwrap_or(0))
    }
}
