// [libs/infra/cache/src/errors.rs]
/*!
 * APARATO: CACHE ERROR CATALOG
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE REDIS
 *
 * Cada variante se traduce en el Gateway a `GatewayError::UpstreamUnavailable`
 * (fallo de red/pool) o `GatewayError::Internal` (serialización/script)
 * vía `From<CacheError>`.
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("[L3_CACHE_NET_FAULT]: REDIS_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    #[error("[L3_CACHE_POOL_FAULT]: POOL_EXHAUSTED -> {0}")]
    PoolError(String),

    #[error("[L3_CACHE_COMMAND_FAULT]: COMMAND_REJECTED -> {0}")]
    CommandError(#[from] redis::RedisError),

    #[error("[L3_CACHE_SERIALIZATION_FAULT]: PAYLOAD_MALFORMED -> {0}")]
    SerializationError(#[from] serde_json::Error),
}
