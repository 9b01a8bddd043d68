// [apps/gateway/src/handlers/scores.rs]
/*!
 * APARATO: SCORING ENGINE HANDLERS
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L1-APP)
 * RESPONSABILIDAD: `UpdateScore` Y `BatchUpdateScore` (§4.3.1, §4.3.2)
 */

use crate::errors::GatewayResult;
use crate::handlers::billing::enforce_monthly_request_quota;
use crate::handlers::leaderboards::require_owned_leaderboard;
use crate::middleware::TenantContext;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use chrono::Utc;
use ledger_domain_models::{ScoreUpdatedEvent, StreamEvent};
use ledger_infra_cache::BatchScoreUpdate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScorePayload {
    pub leaderboard_id: Uuid,
    pub user_id: String,
    pub score: f64,
    #[serde(default)]
    pub increment: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreResponse {
    pub final_score: f64,
    pub rank: u64,
}

pub async fn update_score(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<UpdateScorePayload>,
) -> GatewayResult<Json<UpdateScoreResponse>> {
    enforce_monthly_request_quota(&state, &ctx).await?;
    require_owned_leaderboard(&state, &ctx, payload.leaderboard_id).await?;

    let outcome = state
        .score_store
        .update_score(
            ctx.tenant_id,
            ctx.project_id,
            payload.leaderboard_id,
            &payload.user_id,
            payload.score,
            payload.increment,
        )
        .await?;

    // El evento transporta el delta enviado por el cliente, no el
    // agregado posterior a la actualización (§4.3.1 paso 6).
    state
        .event_publisher
        .publish(&StreamEvent::ScoreUpdated(ScoreUpdatedEvent {
            tenant_id: ctx.tenant_id,
            project_id: ctx.project_id,
            leaderboard_id: payload.leaderboard_id,
            user_id: payload.user_id.clone(),
            score: payload.score,
            increment: payload.increment,
            timestamp: Utc::now(),
        }))
        .await;

    Ok(Json(UpdateScoreResponse { final_score: outcome.final_score, rank: outcome.rank }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateScorePayload {
    pub updates: Vec<UpdateScorePayload>,
}

/// Implementa el algoritmo de §4.3.2: valida pertenencia de cada
/// leaderboard referenciado, delega el agrupado/pre-lectura/pipeline
/// al motor de caché (`ScoreStore::update_score_batch`, una
/// transacción pipelinada por leaderboard distinto en el lote, TTL
/// re-armado una sola vez por leaderboard), y publica un evento
/// `score.updated` por entrada tras confirmarse el lote.
pub async fn batch_update_score(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<BatchUpdateScorePayload>,
) -> GatewayResult<Json<Vec<UpdateScoreResponse>>> {
    enforce_monthly_request_quota(&state, &ctx).await?;

    let mut seen_leaderboards = std::collections::HashSet::new();
    for update in &payload.updates {
        if seen_leaderboards.insert(update.leaderboard_id) {
            require_owned_leaderboard(&state, &ctx, update.leaderboard_id).await?;
        }
    }

    let batch: Vec<BatchScoreUpdate> = payload
        .updates
        .iter()
        .map(|update| BatchScoreUpdate {
            leaderboard_id: update.leaderboard_id,
            user_id: update.user_id.clone(),
            score: update.score,
            force_increment: update.increment,
        })
        .collect();

    let outcomes = state.score_store.update_score_batch(ctx.tenant_id, ctx.project_id, &batch).await?;

    let mut responses = Vec::with_capacity(outcomes.len());
    for (update, outcome) in payload.updates.iter().zip(outcomes.iter()) {
        state
            .event_publisher
            .publish(&StreamEvent::ScoreUpdated(ScoreUpdatedEvent {
                tenant_id: ctx.tenant_id,
                project_id: ctx.project_id,
                leaderboard_id: update.leaderboard_id,
                user_id: update.user_id.clone(),
                score: update.score,
                increment: update.increment,
                timestamp: Utc::now(),
            }))
            .await;

        responses.push(UpdateScoreResponse { final_score: outcome.final_score, rank: outcome.rank });
    }

    Ok(Json(responses))
}
