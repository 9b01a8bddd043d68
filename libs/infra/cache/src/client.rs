// [libs/infra/cache/src/client.rs]
/*!
 * APARATO: REDIS POOL CLIENT
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DEL POOL DE CONEXIONES COMPARTIDO
 *
 * Un único pool sirve las cuatro responsabilidades de la caché:
 * sorted-set de puntajes, rate limiter, caché de autenticación y
 * contadores de uso, más el stream durable de eventos.
 */

use crate::errors::CacheError;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct CachePool {
    pool: Pool,
}

impl CachePool {
    #[instrument]
    pub fn connect(redis_url: &str) -> Result<Self, CacheError> {
        if redis_url.is_empty() {
            return Err(CacheError::ConnectionError("CRITICAL_FAULT: REDIS_URL_UNDEFINED".into()));
        }

        let config = Config::from_url(redis_url);
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::ConnectionError(e.to_string()))?;

        info!("🔌 [CACHE]: Redis pool provisioned against [{}]", redis_url);
        Ok(Self { pool })
    }

    pub async fn get(&self) -> Result<Connection, CacheError> {
        self.pool.get().await.map_err(|e| CacheError::PoolError(e.to_string()))
    }
}
