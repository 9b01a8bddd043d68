// [apps/gateway/src/handlers/identity.rs]
/*!
 * APARATO: IDENTITY & KEYS HANDLERS
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L1-APP)
 * RESPONSABILIDAD: CRUD DE TENANTS, PROJECTS, API KEYS (§4.1, PLANO INTERNO)
 */

use crate::errors::{GatewayError, GatewayResult};
use crate::identity::{generate_plaintext_key, hash_plaintext_key, validate_api_key};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use ledger_domain_billing::quota_limits;
use ledger_domain_models::{
    ApiKey, ApiKeyValidation, CreateApiKeyPayload, CreateApiKeyResponse, CreateProjectPayload,
    CreateTenantPayload, PlanType, Project, Tenant,
};
use serde::Deserialize;
use uuid::Uuid;

pub async fn create_tenant(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenantPayload>,
) -> GatewayResult<Json<Tenant>> {
    let tenant = state.tenants.create(&payload.name, &payload.email).await?;
    Ok(Json(tenant))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectPayload>,
) -> GatewayResult<Json<Project>> {
    state
        .tenants
        .find_by_id(payload.tenant_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("tenant not found".into()))?;

    let project = state.projects.create(payload.tenant_id, &payload.name).await?;
    Ok(Json(project))
}

/// Emite la key en texto plano una única vez; el hash es lo único que
/// sobrevive. Rechaza la emisión si el tenant ya agotó su cuota de
/// keys activas para el plan vigente (§4.6).
pub async fn create_api_key(
    State(state): State<AppState>,
    Json(payload): Json<CreateApiKeyPayload>,
) -> GatewayResult<Json<CreateApiKeyResponse>> {
    let project = state
        .projects
        .find_by_id(payload.project_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("project not found".into()))?;

    let plan_type = state
        .subscriptions
        .find_active_by_tenant(project.tenant_id)
        .await?
        .map(|s| s.plan_type)
        .unwrap_or(PlanType::Free);

    let active_count = state.api_keys.count_active_by_project(payload.project_id).await?;
    let limit = quota_limits(plan_type).active_api_keys as i64;
    if active_count >= limit {
        return Err(GatewayError::QuotaExceeded(format!(
            "active api key quota exhausted ({active_count}/{limit})"
        )));
    }

    let plaintext = generate_plaintext_key();
    let key_hash = hash_plaintext_key(&plaintext)?;
    let created = state.api_keys.create(payload.project_id, &payload.name, &key_hash).await?;

    Ok(Json(CreateApiKeyResponse {
        id: created.id,
        project_id: created.project_id,
        name: created.name,
        plaintext,
        created_at: created.created_at,
    }))
}

pub async fn list_api_keys(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> GatewayResult<Json<Vec<ApiKey>>> {
    let keys = state.api_keys.list_by_project(project_id).await?;
    Ok(Json(keys))
}

/// Revoca una key. La memoización de validaciones positivas en
/// `auth_cache` solo puede invalidarse por texto plano, que el
/// servidor nunca retiene tras su emisión: la revocación se vuelve
/// efectiva a más tardar al expirar el TTL de la caché (≤300s),
/// tal como documenta `DESIGN.md`.
pub async fn revoke_api_key(State(state): State<AppState>, Path(id): Path<Uuid>) -> GatewayResult<Json<ApiKey>> {
    let existing = state
        .api_keys
        .find_by_id(id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("api key not found".into()))?;

    if !existing.is_active() {
        return Err(GatewayError::Conflict("api key already revoked".into()));
    }

    state.api_keys.revoke(id).await?;
    let revoked = state
        .api_keys
        .find_by_id(id)
        .await?
        .ok_or_else(|| GatewayError::Internal("api key vanished after revoke".into()))?;

    Ok(Json(revoked))
}

/// Rotación = revocar la key existente y emitir una nueva para el
/// mismo proyecto con el mismo nombre (§3: "rotation = revoke-then-create").
/// El plaintext anterior queda inservible de inmediato en la base
/// relacional; igual que en `revoke_api_key`, la caché de validaciones
/// positivas puede seguir aceptando el plaintext viejo hasta su TTL.
pub async fn rotate_api_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> GatewayResult<Json<CreateApiKeyResponse>> {
    let existing = state
        .api_keys
        .find_by_id(id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("api key not found".into()))?;

    if !existing.is_active() {
        return Err(GatewayError::Conflict("api key already revoked".into()));
    }

    state.api_keys.revoke(id).await?;

    let plaintext = generate_plaintext_key();
    let key_hash = hash_plaintext_key(&plaintext)?;
    let created = state.api_keys.create(existing.project_id, &existing.name, &key_hash).await?;

    Ok(Json(CreateApiKeyResponse {
        id: created.id,
        project_id: created.project_id,
        name: created.name,
        plaintext,
        created_at: created.created_at,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateApiKeyPayload {
    pub api_key: String,
}

pub async fn validate_api_key_handler(
    State(state): State<AppState>,
    Json(payload): Json<ValidateApiKeyPayload>,
) -> GatewayResult<Json<ApiKeyValidation>> {
    let validation = validate_api_key(&state, &payload.api_key).await?;
    Ok(Json(validation))
}
