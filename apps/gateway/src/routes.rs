// [apps/gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: HTTP ROUTER (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: APPLICATION ENTRYPOINT (ESTRATO L1-APP)
 * RESPONSABILIDAD: COMPOSICIÓN DE LA SUPERFICIE HTTP (§6.1)
 *
 * Tres planos: público (`X-Api-Key`), interno (`X-Internal-Secret`)
 * y sin autenticación (`/health`). Las rutas de temporadas no
 * aparecen en la tabla de superficie del contrato pero se tratan
 * como parte del mismo módulo de control que los leaderboards
 * (ver `DESIGN.md`).
 * =================================================================
 */

use crate::handlers::{billing, health, identity, leaderboards, scores, seasons, usage};
use crate::middleware::{api_key_guard, internal_guard};
use crate::state::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

fn public_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/scores", post(scores::update_score))
        .route("/scores/batch-update", post(scores::batch_update_score))
        .route("/leaderboards", post(leaderboards::create_leaderboard).get(leaderboards::list_leaderboards))
        .route(
            "/leaderboards/:id",
            put(leaderboards::update_leaderboard).delete(leaderboards::delete_leaderboard),
        )
        .route("/leaderboards/:id/top", get(leaderboards::top))
        .route("/leaderboards/:id/rank/:userId", get(leaderboards::rank))
        .route(
            "/leaderboards/:id/seasons",
            post(seasons::create_season).get(seasons::list_seasons),
        )
        .route("/seasons/:id/activate", patch(seasons::activate_season))
        .route("/seasons/:id/deactivate", patch(seasons::deactivate_season))
        .route("/seasons/:id", delete(seasons::delete_season))
        .layer(from_fn_with_state(state, api_key_guard))
}

fn internal_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/tenants", post(identity::create_tenant))
        .route("/projects", post(identity::create_project))
        .route("/api-keys", post(identity::create_api_key))
        .route("/api-keys/project/:projectId", get(identity::list_api_keys))
        .route("/api-keys/:id/revoke", patch(identity::revoke_api_key))
        .route("/api-keys/:id/rotate", patch(identity::rotate_api_key))
        .route("/validate", post(identity::validate_api_key_handler))
        .route("/subscriptions", post(billing::create_subscription))
        .route("/subscriptions/tenant/:id", get(billing::get_subscription_by_tenant))
        .route("/subscriptions/:id/cancel", patch(billing::cancel_subscription))
        .route("/subscriptions/:id/usage-check", get(billing::usage_check))
        .route("/usage/record", post(usage::record_usage))
        .route("/usage/tenant/:id", get(usage::get_usage_by_tenant))
        .layer(from_fn_with_state(state, internal_guard))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .merge(public_routes(state.clone()))
        .merge(internal_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
