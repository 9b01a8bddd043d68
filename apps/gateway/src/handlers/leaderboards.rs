// [apps/gateway/src/handlers/leaderboards.rs]
/*!
 * APARATO: LEADERBOARD CONTROL HANDLERS
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L1-APP)
 * RESPONSABILIDAD: CRUD DE LEADERBOARDS Y CONSULTAS DE RANKING (§4.4, §4.3.3)
 */

use crate::errors::{GatewayError, GatewayResult};
use crate::handlers::billing::enforce_monthly_request_quota;
use crate::middleware::TenantContext;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use chrono::Utc;
use ledger_domain_billing::quota_limits;
use ledger_domain_models::{
    CreateLeaderboardPayload, Leaderboard, LeaderboardCreatedEvent, LeaderboardDeletedEvent, PlanType,
    StreamEvent, UpdateLeaderboardPayload,
};
use ledger_infra_cache::{RankResult, TopResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resuelve un leaderboard y verifica que pertenezca al proyecto del
/// contexto de tenant; reutilizado por `scores` y `seasons`.
pub(crate) async fn require_owned_leaderboard(
    state: &AppState,
    ctx: &TenantContext,
    leaderboard_id: Uuid,
) -> GatewayResult<Leaderboard> {
    let leaderboard = state
        .leaderboards
        .find_by_id(leaderboard_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("leaderboard not found".into()))?;

    if leaderboard.tenant_id != ctx.tenant_id || leaderboard.project_id != ctx.project_id {
        return Err(GatewayError::Forbidden("leaderboard does not belong to this project".into()));
    }

    Ok(leaderboard)
}

async fn resolve_plan_type(state: &AppState, tenant_id: Uuid) -> GatewayResult<PlanType> {
    Ok(state
        .subscriptions
        .find_active_by_tenant(tenant_id)
        .await?
        .map(|s| s.plan_type)
        .unwrap_or(PlanType::Free))
}

pub async fn create_leaderboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CreateLeaderboardPayload>,
) -> GatewayResult<Json<Leaderboard>> {
    enforce_monthly_request_quota(&state, &ctx).await?;

    let plan_type = resolve_plan_type(&state, ctx.tenant_id).await?;
    let current_count = state.leaderboards.count_by_project(ctx.project_id).await?;
    let limit = quota_limits(plan_type).leaderboards as i64;
    if current_count >= limit {
        return Err(GatewayError::QuotaExceeded(format!(
            "leaderboard quota exhausted ({current_count}/{limit})"
        )));
    }

    let leaderboard = state
        .leaderboards
        .create(
            ctx.project_id,
            ctx.tenant_id,
            &payload.name,
            payload.description.as_deref(),
            payload.sort_order,
            payload.update_mode,
            payload.ttl_days,
            payload.metadata.unwrap_or_default(),
        )
        .await?;

    state
        .event_publisher
        .publish(&StreamEvent::LeaderboardCreated(LeaderboardCreatedEvent {
            event_type: "leaderboard.created".into(),
            leaderboard_id: leaderboard.id,
            project_id: leaderboard.project_id,
            tenant_id: leaderboard.tenant_id,
            name: leaderboard.name.clone(),
            sort_order: leaderboard.sort_order,
            update_mode: leaderboard.update_mode,
            ttl_days: leaderboard.ttl_days,
            timestamp: Utc::now(),
        }))
        .await;

    Ok(Json(leaderboard))
}

pub async fn list_leaderboards(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> GatewayResult<Json<Vec<Leaderboard>>> {
    let leaderboards = state.leaderboards.list_by_project(ctx.project_id).await?;
    Ok(Json(leaderboards))
}

/// Las mutaciones que tocan el hash de metadatos en caché se
/// resincronizan vía un `leaderboard.created` reemitido: el Worker
/// trata ese subject como un upsert idempotente (§4.4).
pub async fn update_leaderboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateLeaderboardPayload>,
) -> GatewayResult<Json<Leaderboard>> {
    require_owned_leaderboard(&state, &ctx, id).await?;

    let resync_needed = patch.touches_metadata_hash();
    let updated = state.leaderboards.update(id, &patch).await?;

    if resync_needed {
        state
            .event_publisher
            .publish(&StreamEvent::LeaderboardCreated(LeaderboardCreatedEvent {
                event_type: "leaderboard.created".into(),
                leaderboard_id: updated.id,
                project_id: updated.project_id,
                tenant_id: updated.tenant_id,
                name: updated.name.clone(),
                sort_order: updated.sort_order,
                update_mode: updated.update_mode,
                ttl_days: updated.ttl_days,
                timestamp: Utc::now(),
            }))
            .await;
    }

    Ok(Json(updated))
}

pub async fn delete_leaderboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> GatewayResult<Json<Leaderboard>> {
    require_owned_leaderboard(&state, &ctx, id).await?;
    let deleted = state.leaderboards.delete(id).await?;

    state
        .event_publisher
        .publish(&StreamEvent::LeaderboardDeleted(LeaderboardDeletedEvent {
            event_type: "leaderboard.deleted".into(),
            leaderboard_id: deleted.id,
            project_id: deleted.project_id,
            tenant_id: deleted.tenant_id,
            name: deleted.name.clone(),
            timestamp: Utc::now(),
        }))
        .await;

    Ok(Json(deleted))
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEntry {
    pub rank: u64,
    pub user_id: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopResponse {
    pub entries: Vec<TopEntry>,
    pub total: u64,
}

impl From<TopResult> for TopResponse {
    fn from(result: TopResult) -> Self {
        Self {
            entries: result
                .entries
                .into_iter()
                .map(|(rank, user_id, score)| TopEntry { rank, user_id, score })
                .collect(),
            total: result.total,
        }
    }
}

pub async fn top(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<TopQuery>,
) -> GatewayResult<Json<TopResponse>> {
    let leaderboard = require_owned_leaderboard(&state, &ctx, id).await?;
    let limit = query.limit.unwrap_or(20).min(100);
    let offset = query.offset.unwrap_or(0);

    let result = state
        .score_store
        .top(ctx.tenant_id, ctx.project_id, leaderboard.id, leaderboard.sort_order, limit, offset)
        .await?;

    Ok(Json(result.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankQuery {
    #[serde(default)]
    pub with_neighbors: bool,
    pub neighbor_count: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankResponse {
    pub rank: Option<u64>,
    pub score: Option<f64>,
    pub neighbors: Option<NeighborsResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborsResponse {
    pub above: Vec<TopEntry>,
    pub below: Vec<TopEntry>,
}

impl From<RankResult> for RankResponse {
    fn from(result: RankResult) -> Self {
        let neighbors = if result.above.is_empty() && result.below.is_empty() {
            None
        } else {
            Some(NeighborsResponse {
                above: result.above.into_iter().map(|(r, u, s)| TopEntry { rank: r, user_id: u, score: s }).collect(),
                below: result.below.into_iter().map(|(r, u, s)| TopEntry { rank: r, user_id: u, score: s }).collect(),
            })
        };
        Self { rank: result.rank, score: result.score, neighbors }
    }
}

pub async fn rank(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((id, user_id)): Path<(Uuid, String)>,
    Query(query): Query<RankQuery>,
) -> GatewayResult<Json<RankResponse>> {
    let leaderboard = require_owned_leaderboard(&state, &ctx, id).await?;
    let neighbor_count = query.neighbor_count.unwrap_or(5).min(10);

    let result = state
        .score_store
        .rank_of(
            ctx.tenant_id,
            ctx.project_id,
            leaderboard.id,
            leaderboard.sort_order,
            &user_id,
            query.with_neighbors,
            neighbor_count,
        )
        .await?;

    Ok(Json(result.into()))
}
