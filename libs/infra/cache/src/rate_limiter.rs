// [libs/infra/cache/src/rate_limiter.rs]
/*!
 * =================================================================
 * APARATO: TOKEN-BUCKET RATE LIMITER
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: ADMISIÓN POR TENANT VÍA CUBO DE FICHAS (§4.2.1)
 *
 * Estado en `rl:{tenantId}` (hash `{tokens, last_refill}`, TTL 60s).
 * Lectura-recarga-escritura se ejecuta como un único EVAL para evitar
 * que dos réplicas del Gateway pisen la recarga de la otra.
 * =================================================================
 */

use crate::errors::CacheError;
use crate::CachePool;
use redis::Script;
use tracing::instrument;
use uuid::Uuid;

/// Recarga linealmente `tokens` hasta `capacity` según el tiempo
/// transcurrido desde `last_refill`, luego intenta debitar un token.
/// Retorna `{allowed, tokens_remaining, retry_after_millis}`.
const TOKEN_BUCKET_SCRIPT: &str = r#"
local key = KEYS[1]
local capacity = tonumber(ARGV[1])
local refill_per_sec = tonumber(ARGV[2])
local now_millis = tonumber(ARGV[3])
local key_ttl_secs = tonumber(ARGV[4])

local bucket = redis.call('HMGET', key, 'tokens', 'last_refill')
local tokens = tonumber(bucket[1])
local last_refill = tonumber(bucket[2])

if tokens == nil then
  tokens = capacity
  last_refill = now_millis
end

local elapsed_millis = now_millis - last_refill
if elapsed_millis > 0 then
  local refilled = (elapsed_millis / 1000.0) * refill_per_sec
  tokens = math.min(capacity, tokens + refilled)
  last_refill = now_millis
end

local allowed = 0
if tokens >= 1 then
  tokens = tokens - 1
  allowed = 1
end

redis.call('HSET', key, 'tokens', tokens, 'last_refill', last_refill)
redis.call('EXPIRE', key, key_ttl_secs)

local retry_after_millis = 0
if allowed == 0 then
  local deficit = 1 - tokens
  retry_after_millis = math.ceil((deficit / refill_per_sec) * 1000)
end

local reset_after_millis = 0
local deficit_to_full = capacity - tokens
if deficit_to_full > 0 then
  reset_after_millis = math.ceil((deficit_to_full / refill_per_sec) * 1000)
end

return { allowed, math.floor(tokens), retry_after_millis, reset_after_millis }
"#;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub retry_after_millis: u64,
    /// Milisegundos hasta que el cubo vuelva a su capacidad máxima.
    pub reset_after_millis: u64,
}

pub struct RateLimiter {
    pool: CachePool,
    script: Script,
}

impl RateLimiter {
    pub fn new(pool: CachePool) -> Self {
        Self { pool, script: Script::new(TOKEN_BUCKET_SCRIPT) }
    }

    fn key(tenant_id: Uuid) -> String {
        format!("rl:{}", tenant_id)
    }

    /// Evalúa una admisión. `now_millis` se pasa desde el llamador
    /// (el reloj del sistema, nunca generado dentro de este módulo)
    /// para que el script permanezca puro y reproducible en pruebas.
    #[instrument(skip(self))]
    pub async fn check(
        &self,
        tenant_id: Uuid,
        capacity: u32,
        refill_per_sec: u32,
        now_millis: i64,
        key_ttl_secs: u64,
    ) -> Result<RateLimitDecision, CacheError> {
        let mut conn = self.pool.get().await?;
        let key = Self::key(tenant_id);

        let (allowed, remaining, retry_after_millis, reset_after_millis): (i64, i64, i64, i64) = self
            .script
            .key(key)
            .arg(capacity)
            .arg(refill_per_sec)
            .arg(now_millis)
            .arg(key_ttl_secs)
            .invoke_async(&mut conn)
            .await?;

        Ok(RateLimitDecision {
            allowed: allowed == 1,
            remaining: remaining.max(0) as u32,
            limit: capacity,
            retry_after_millis: retry_after_millis.max(0) as u64,
            reset_after_millis: reset_after_millis.max(0) as u64,
        })
    }
}
