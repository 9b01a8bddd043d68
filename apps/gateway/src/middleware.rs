// [apps/gateway/src/middleware.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY SECURITY & ADMISSION GUARDS (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L1-APP)
 * RESPONSABILIDAD: AUTENTICACIÓN, RATE LIMITING Y CONTEXTO DE TENANT (§4.2)
 * =================================================================
 */

use crate::errors::GatewayError;
use crate::identity::validate_api_key;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use ledger_domain_billing::rate_limit_params;
use ledger_domain_models::{PlanType, UsageDelta};
use subtle::ConstantTimeEq;
use tracing::warn;
use uuid::Uuid;

/// Contexto resuelto por `api_key_guard`, inyectado en las extensiones
/// de la petición para que los handlers lo recuperen sin revalidar.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub plan_type: PlanType,
}

fn plan_type_label(plan_type: PlanType) -> &'static str {
    match plan_type {
        PlanType::Free => "free",
        PlanType::Pro => "pro",
        PlanType::Enterprise => "enterprise",
    }
}

/// Guardia perimetral de rutas internas (`X-Internal-Secret`).
/// Comparación en tiempo constante: el secreto nunca debe filtrarse
/// a través de una diferencia mensurable en latencia de respuesta.
pub async fn internal_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let provided = req
        .headers()
        .get("X-Internal-Secret")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
        .as_bytes();
    let expected = state.internal_secret.as_bytes();

    let equal_length = provided.len() == expected.len();
    let bytes_match: bool = if equal_length { provided.ct_eq(expected).into() } else { false };

    if !bytes_match {
        warn!("⛔ [INTERNAL_GUARD]: Rejected request with invalid X-Internal-Secret.");
        return Err(GatewayError::Unauthenticated("invalid internal secret".into()));
    }

    Ok(next.run(req).await)
}

/// Guardia perimetral de rutas públicas (`X-Api-Key`): valida la
/// identidad, aplica el cubo de fichas por tenant y propaga el
/// contexto resuelto (§6.2), registrando uso al completar la respuesta.
pub async fn api_key_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let plaintext = req
        .headers()
        .get("X-Api-Key")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| GatewayError::Unauthenticated("missing X-Api-Key header".into()))?
        .to_string();

    let validation = validate_api_key(&state, &plaintext).await?;
    if !validation.valid {
        return Err(GatewayError::Unauthenticated("invalid or revoked api key".into()));
    }

    let tenant_id = validation.tenant_id.expect("valid validation always carries a tenant_id");
    let project_id = validation.project_id.expect("valid validation always carries a project_id");
    let plan_type = validation.plan_type.unwrap_or(PlanType::Free);

    let path = req.uri().path().to_string();

    let limits = rate_limit_params(plan_type);
    let now_millis = Utc::now().timestamp_millis();

    // Si la caché está caída, §4.2.1 manda fallar abierto en vez de
    // tumbar el plano público por un 503 del rate limiter. La bandera
    // `rate_limit_enabled` permite desactivar la admisión por completo.
    let decision = if state.config.rate_limit_enabled {
        match state
            .rate_limiter
            .check(tenant_id, limits.capacity, limits.refill_per_sec, now_millis, state.config.rl_key_ttl_secs)
            .await
        {
            Ok(decision) => Some(decision),
            Err(cache_fault) => {
                warn!("⚠️  [RATE_LIMIT]: cache unreachable, failing open: {}", cache_fault);
                None
            }
        }
    } else {
        None
    };

    if let Some(decision) = decision {
        if !decision.allowed {
            return Err(GatewayError::RateLimited {
                retry_after_millis: decision.retry_after_millis,
                limit: decision.limit,
                reset_epoch_seconds: reset_epoch_seconds(now_millis, decision.reset_after_millis),
            });
        }
    }

    req.extensions_mut().insert(TenantContext { tenant_id, project_id, plan_type });
    req.headers_mut().insert("X-Tenant-Id", tenant_id.to_string().parse().unwrap());
    req.headers_mut().insert("X-Project-Id", project_id.to_string().parse().unwrap());
    req.headers_mut().insert("X-Plan-Type", plan_type_label(plan_type).parse().unwrap());

    let mut response = next.run(req).await;

    if let Some(decision) = decision {
        let reset = reset_epoch_seconds(now_millis, decision.reset_after_millis);
        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", decision.limit.to_string().parse().unwrap());
        headers.insert("X-RateLimit-Remaining", decision.remaining.to_string().parse().unwrap());
        headers.insert("X-RateLimit-Reset", reset.to_string().parse().unwrap());
    }

    // §4.2.2: solo las respuestas no-4xx/no-5xx cuentan para la cuota.
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Ok(response);
    }

    if let Err(usage_fault) = state.usage_counters.record_request(tenant_id, project_id).await {
        warn!("⚠️  [USAGE]: Failed to record hot-path usage counters: {}", usage_fault);
    }

    let delta = usage_delta_for(&path);
    if let Err(usage_fault) = state.usage_records.record(tenant_id, project_id, Utc::now().date_naive(), delta).await
    {
        warn!("⚠️  [USAGE]: Failed to record durable usage row: {}", usage_fault);
    }

    Ok(response)
}

fn reset_epoch_seconds(now_millis: i64, reset_after_millis: u64) -> i64 {
    now_millis / 1000 + ((reset_after_millis as i64) + 999) / 1000
}

/// Clasifica qué columna de `UsageRecord` corresponde a la ruta tenanted
/// atendida (§4.6: toda petición cuenta para `total_requests`, las de
/// escritura de score también para `score_updates`, las de lectura de
/// leaderboard para `leaderboard_reads`).
fn usage_delta_for(path: &str) -> UsageDelta {
    if path.starts_with("/scores") {
        UsageDelta { score_updates: 1, total_requests: 1, ..Default::default() }
    } else if path.ends_with("/top") || path.contains("/rank/") {
        UsageDelta { leaderboard_reads: 1, total_requests: 1, ..Default::default() }
    } else {
        UsageDelta { total_requests: 1, ..Default::default() }
    }
}
