// [tests/mirror/apps/gateway/middleware/auth.test.rs]
/*!
 * =================================================================
 * APARATO: API KEY GUARD TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-APP-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE `api_key_guard` Y PROPAGACIÓN DE CONTEXTO (§4.2)
 * =================================================================
 */

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ledger_gateway::routes::build_router;
use ledger_gateway::state::AppState;
use ledger_gateway::config::GatewayConfig;
use ledger_infra_cache::CachePool;
use ledger_infra_db::RelationalClient;
use serde_json::{json, Value};
use tower::ServiceExt;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

async fn test_router(memory_tag: &str) -> Router {
    let database_client = RelationalClient::connect(
        &format!("file::mem_{}?mode=memory&cache=shared", memory_tag),
        None,
    )
    .await
    .expect("in-memory relational client");
    let cache_pool = CachePool::connect(&redis_url()).expect("redis pool");
    let state = AppState::new(database_client, cache_pool, GatewayConfig::default());
    build_router(state)
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn internal_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Internal-Secret", "test-internal-secret")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Provisions a tenant, project and api key, returning the key's id and plaintext.
async fn provision_key(app: &Router, suffix: &str) -> (String, String) {
    let tenant = body_json(
        app.clone()
            .oneshot(internal_json(
                "POST",
                "/tenants",
                json!({"name": format!("tenant-{}", suffix), "email": format!("{}@auth.test", suffix)}),
            ))
            .await
            .unwrap(),
    )
    .await;
    let tenant_id = tenant["id"].as_str().unwrap().to_string();

    let project = body_json(
        app.clone()
            .oneshot(internal_json("POST", "/projects", json!({"tenantId": tenant_id, "name": "game"})))
            .await
            .unwrap(),
    )
    .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let key = body_json(
        app.clone()
            .oneshot(internal_json("POST", "/api-keys", json!({"projectId": project_id, "name": "svc"})))
            .await
            .unwrap(),
    )
    .await;
    let plaintext = key["plaintext"].as_str().unwrap().to_string();
    let key_id = key["id"].as_str().unwrap().to_string();

    (key_id, plaintext)
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn missing_api_key_header_is_unauthenticated() {
    let app = test_router("auth_v1").await;

    let response = app
        .oneshot(Request::builder().uri("/leaderboards").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn unknown_api_key_is_unauthenticated() {
    let app = test_router("auth_v2").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/leaderboards")
                .header("X-Api-Key", "ak_not_a_real_key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn revoked_api_key_is_rejected() {
    let app = test_router("auth_v3").await;
    let (key_id, plaintext) = provision_key(&app, "auth3").await;

    app.clone()
        .oneshot(internal_json("PATCH", &format!("/api-keys/{}/revoke", key_id), json!({})))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/leaderboards")
                .header("X-Api-Key", &plaintext)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn valid_api_key_propagates_tenant_context_headers() {
    let app = test_router("auth_v4").await;
    let (_key_id, plaintext) = provision_key(&app, "auth4").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/leaderboards")
                .header("X-Api-Key", &plaintext)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("X-RateLimit-Limit").is_some());
    assert!(response.headers().get("X-RateLimit-Remaining").is_some());
}
