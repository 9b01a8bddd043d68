// [apps/gateway/src/handlers/health.rs]
/*!
 * APARATO: HEALTH PROBE
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L1-APP)
 */

use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
