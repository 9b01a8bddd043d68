// [apps/gateway/src/identity.rs]
/*!
 * APARATO: API KEY ISSUANCE & VALIDATION SERVICE
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: GENERACIÓN SEGURA Y VALIDACIÓN DE API KEYS (§4.1)
 *
 * La validación itera el conjunto filtrado-por-revocación primero
 * (minimiza comparaciones) y compara el texto plano en tiempo
 * constante vía `bcrypt::verify`, que ya implementa esa garantía
 * internamente. Solo las validaciones positivas se memoizan; una
 * revocación nunca queda enmascarada más allá del TTL de la caché.
 */

use crate::errors::{GatewayError, GatewayResult};
use crate::state::AppState;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ledger_domain_models::{ApiKeyValidation, PlanType};
use rand::RngCore;
use tracing::{debug, instrument};

const API_KEY_PREFIX: &str = "ak_";
const BCRYPT_COST: u32 = 10;

/// Genera un secreto de 256 bits codificado URL-safe, prefijado `ak_`.
pub fn generate_plaintext_key() -> String {
    let mut entropy = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut entropy);
    format!("{}{}", API_KEY_PREFIX, URL_SAFE_NO_PAD.encode(entropy))
}

pub fn hash_plaintext_key(plaintext: &str) -> GatewayResult<String> {
    bcrypt::hash(plaintext, BCRYPT_COST).map_err(|e| GatewayError::Internal(e.to_string()))
}

#[instrument(skip(state, plaintext))]
pub async fn validate_api_key(state: &AppState, plaintext: &str) -> GatewayResult<ApiKeyValidation> {
    if let Some(cached) = state.auth_cache.get(plaintext).await? {
        if cached.valid {
            return Ok(cached);
        }
    }

    let active_keys = state.api_keys.find_all_active().await?;

    for candidate in active_keys {
        if bcrypt::verify(plaintext, &candidate.key_hash).unwrap_or(false) {
            let project = state
                .projects
                .find_by_id(candidate.project_id)
                .await?
                .ok_or_else(|| GatewayError::Internal("api key references a missing project".into()))?;

            let plan_type = state
                .subscriptions
                .find_active_by_tenant(project.tenant_id)
                .await?
                .map(|s| s.plan_type)
                .unwrap_or(PlanType::Free);

            let _ = state.api_keys.touch_last_used(candidate.id).await;

            let validation = ApiKeyValidation {
                valid: true,
                tenant_id: Some(project.tenant_id),
                project_id: Some(project.id),
                plan_type: Some(plan_type),
            };

            state.auth_cache.put_positive(plaintext, &validation, state.config.auth_cache_ttl_secs).await?;
            return Ok(validation);
        }
    }

    debug!("[IDENTITY]: No active key matched the presented plaintext.");
    Ok(ApiKeyValidation::invalid())
}
