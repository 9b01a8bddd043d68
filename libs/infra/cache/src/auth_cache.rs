// [libs/infra/cache/src/auth_cache.rs]
/*!
 * APARATO: AUTHENTICATION MEMOIZATION CACHE
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: MEMOIZACIÓN DE VALIDACIONES POSITIVAS DE API KEY
 *
 * Clave `auth:{sha256(plaintext)[:16]}` (§6.3), TTL <= 300s. Solo se
 * memoizan validaciones POSITIVAS: cachear negativos retrasaría la
 * propagación de una revocación más allá de lo que el spec tolera.
 */

use crate::errors::CacheError;
use crate::CachePool;
use ledger_domain_models::ApiKeyValidation;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::instrument;

const MAX_TTL_SECONDS: u64 = 300;

pub struct AuthCache {
    pool: CachePool,
}

impl AuthCache {
    pub fn new(pool: CachePool) -> Self {
        Self { pool }
    }

    /// Deriva la clave de caché sin persistir jamás el texto plano.
    pub fn fingerprint(plaintext: &str) -> String {
        let digest = Sha256::digest(plaintext.as_bytes());
        let hex = hex::encode(digest);
        format!("auth:{}", &hex[..16])
    }

    #[instrument(skip(self, plaintext))]
    pub async fn get(&self, plaintext: &str) -> Result<Option<ApiKeyValidation>, CacheError> {
        let mut conn = self.pool.get().await?;
        let key = Self::fingerprint(plaintext);

        let raw: Option<String> = conn.get(&key).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Solo debe invocarse con un resultado `valid: true`. El llamador
    /// (el servicio de Identity) es responsable de no invocar esto
    /// para validaciones negativas.
    #[instrument(skip(self, plaintext, validation))]
    pub async fn put_positive(
        &self,
        plaintext: &str,
        validation: &ApiKeyValidation,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        debug_assert!(validation.valid, "auth_cache::put_positive invocado con una validación negativa");

        let mut conn = self.pool.get().await?;
        let key = Self::fingerprint(plaintext);
        let json = serde_json::to_string(validation)?;
        let ttl = ttl_seconds.min(MAX_TTL_SECONDS);

        let _: () = conn.set_ex(&key, json, ttl).await?;
        Ok(())
    }

    /// Invalida inmediatamente el caché para una key dada (rotación o
    /// revocación explícita), adelantándose al vencimiento natural del TTL.
    #[instrument(skip(self, plaintext))]
    pub async fn invalidate(&self, plaintext: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let key = Self::fingerprint(plaintext);
        let _: () = conn.del(&key).await?;
        Ok(())
    }
}
