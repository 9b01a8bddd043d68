// [libs/infra/db/src/repositories/usage.rs]
/*!
 * APARATO: USAGE REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: UPSERT DIARIO Y AGREGACIÓN MES-A-LA-FECHA
 *
 * `record` upsert-ea la fila del día vigente con `ON CONFLICT ...
 * DO UPDATE SET ... = col + excluded.col` (mismo patrón que el
 * repositorio de gamificación del aparato original), garantizando
 * que los deltas se sumen en vez de sobrescribirse.
 */

use crate::errors::DbError;
use crate::RelationalClient;
use chrono::{Datelike, NaiveDate};
use ledger_domain_models::{UsageDelta, UsageRecord};
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct UsageRepository {
    database_client: RelationalClient,
}

impl UsageRepository {
    pub fn new(client: RelationalClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self))]
    pub async fn record(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        date: NaiveDate,
        delta: UsageDelta,
    ) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;

        connection
            .execute(
                "INSERT INTO usage_records (tenant_id, project_id, date, score_updates, leaderboard_reads, total_requests)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(tenant_id, project_id, date) DO UPDATE SET
                    score_updates = score_updates + excluded.score_updates,
                    leaderboard_reads = leaderboard_reads + excluded.leaderboard_reads,
                    total_requests = total_requests + excluded.total_requests",
                params![
                    tenant_id.to_string(),
                    project_id.to_string(),
                    date.to_string(),
                    delta.score_updates,
                    delta.leaderboard_reads,
                    delta.total_requests,
                ],
            )
            .await?;

        Ok(())
    }

    /// Suma `total_requests` desde el primer día del mes de `as_of`
    /// hasta `as_of` inclusive, para un tenant a través de todos sus
    /// proyectos (insumo de `UsageCheck`, §4.6).
    #[instrument(skip(self))]
    pub async fn requests_month_to_date(&self, tenant_id: Uuid, as_of: NaiveDate) -> Result<u64, DbError> {
        let connection = self.database_client.get_connection()?;
        let month_start = as_of.with_day(1).ok_or_else(|| DbError::MappingError("invalid date".into()))?;

        let mut rows = connection
            .query(
                "SELECT COALESCE(SUM(total_requests), 0) FROM usage_records
                 WHERE tenant_id = ?1 AND date >= ?2 AND date <= ?3",
                params![tenant_id.to_string(), month_start.to_string(), as_of.to_string()],
            )
            .await?;

        let total: i64 = rows.next().await?.map(|row| row.get(0)).transpose()?.unwrap_or(0);
        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self))]
    pub async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<UsageRecord>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT tenant_id, project_id, date, score_updates, leaderboard_reads, total_requests
                 FROM usage_records WHERE tenant_id = ?1 ORDER BY date DESC",
                params![tenant_id.to_string()],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(map_usage_row(&row)?);
        }
        Ok(records)
    }
}

fn map_usage_row(row: &libsql::Row) -> Result<UsageRecord, DbError> {
    let tenant_id: String = row.get(0)?;
    let project_id: String = row.get(1)?;
    let date: String = row.get(2)?;
    let score_updates: i64 = row.get(3)?;
    let leaderboard_reads: i64 = row.get(4)?;
    let total_requests: i64 = row.get(5)?;

    Ok(UsageRecord {
        tenant_id: Uuid::parse_str(&tenant_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        project_id: Uuid::parse_str(&project_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| DbError::MappingError(e.to_string()))?,
        score_updates,
        leaderboard_reads,
        total_requests,
    })
}
