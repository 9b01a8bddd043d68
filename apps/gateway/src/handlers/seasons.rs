// [apps/gateway/src/handlers/seasons.rs]
/*!
 * APARATO: SEASON CONTROL HANDLERS
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L1-APP)
 * RESPONSABILIDAD: CRUD DE TEMPORADAS, SIN EFECTOS EN EL SORTED-SET (§4.4)
 *
 * La tabla de superficie HTTP no enumera estas rutas explícitamente,
 * pero §4.4 especifica las operaciones de temporada como parte del
 * mismo módulo de control que los leaderboards; se exponen bajo el
 * mismo guardia `X-Api-Key` y el mismo alcance de propiedad por
 * proyecto (ver `DESIGN.md`).
 */

use crate::errors::{GatewayError, GatewayResult};
use crate::handlers::leaderboards::require_owned_leaderboard;
use crate::middleware::TenantContext;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::Json;
use ledger_domain_models::{CreateSeasonPayload, Season};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// Resuelve una temporada y confirma que su leaderboard pertenece al
/// proyecto del contexto de tenant.
async fn require_owned_season(state: &AppState, ctx: &TenantContext, season_id: Uuid) -> GatewayResult<Season> {
    let season = state
        .seasons
        .find_by_id(season_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("season not found".into()))?;

    require_owned_leaderboard(state, ctx, season.leaderboard_id).await?;
    Ok(season)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeasonBody {
    pub name: String,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    pub metadata: Option<Value>,
}

pub async fn create_season(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(leaderboard_id): Path<Uuid>,
    Json(body): Json<CreateSeasonBody>,
) -> GatewayResult<Json<Season>> {
    require_owned_leaderboard(&state, &ctx, leaderboard_id).await?;

    let payload = CreateSeasonPayload {
        leaderboard_id,
        name: body.name,
        start_date: body.start_date,
        end_date: body.end_date,
        metadata: body.metadata,
    };

    let season = state
        .seasons
        .create(
            payload.leaderboard_id,
            &payload.name,
            payload.start_date,
            payload.end_date,
            payload.metadata.unwrap_or_default(),
        )
        .await?;

    Ok(Json(season))
}

pub async fn list_seasons(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(leaderboard_id): Path<Uuid>,
) -> GatewayResult<Json<Vec<Season>>> {
    require_owned_leaderboard(&state, &ctx, leaderboard_id).await?;
    let seasons = state.seasons.list_by_leaderboard(leaderboard_id).await?;
    Ok(Json(seasons))
}

pub async fn activate_season(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> GatewayResult<Json<Season>> {
    require_owned_season(&state, &ctx, id).await?;
    let season = state.seasons.set_active(id, true).await?;
    Ok(Json(season))
}

pub async fn deactivate_season(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> GatewayResult<Json<Season>> {
    require_owned_season(&state, &ctx, id).await?;
    let season = state.seasons.set_active(id, false).await?;
    Ok(Json(season))
}

pub async fn delete_season(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> GatewayResult<Json<()>> {
    require_owned_season(&state, &ctx, id).await?;
    state.seasons.delete(id).await?;
    Ok(Json(()))
}
