// [apps/gateway/src/handlers/usage.rs]
/*!
 * APARATO: USAGE RECORDING HANDLERS
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L1-APP)
 * RESPONSABILIDAD: UPSERT DIARIO DE USO RELACIONAL (§4.6, PLANO INTERNO)
 *
 * Distinto de `ledger_infra_cache::UsageCounters`, que lleva el
 * contador caliente por request en la caché: este aparato persiste
 * el agregado diario que alimenta `UsageCheck`.
 */

use crate::errors::GatewayResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use ledger_domain_models::{UsageDelta, UsageRecord};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUsagePayload {
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    #[serde(default)]
    pub score_updates: i64,
    #[serde(default)]
    pub leaderboard_reads: i64,
    #[serde(default)]
    pub total_requests: i64,
}

pub async fn record_usage(
    State(state): State<AppState>,
    Json(payload): Json<RecordUsagePayload>,
) -> GatewayResult<Json<()>> {
    let delta = UsageDelta {
        score_updates: payload.score_updates,
        leaderboard_reads: payload.leaderboard_reads,
        total_requests: payload.total_requests,
    };
    state
        .usage_records
        .record(payload.tenant_id, payload.project_id, Utc::now().date_naive(), delta)
        .await?;
    Ok(Json(()))
}

pub async fn get_usage_by_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> GatewayResult<Json<Vec<UsageRecord>>> {
    let records = state.usage_records.list_by_tenant(tenant_id).await?;
    Ok(Json(records))
}
