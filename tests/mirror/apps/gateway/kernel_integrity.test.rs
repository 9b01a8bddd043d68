// [tests/mirror/apps/gateway/kernel_integrity.test.rs]
/*!
 * =================================================================
 * APARATO: ROUTER COMPOSITION TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-APP-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA COMPOSICIÓN DE LOS TRES PLANOS (§6.1)
 * =================================================================
 */

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ledger_gateway::routes::build_router;
use ledger_gateway::state::AppState;
use ledger_gateway::config::GatewayConfig;
use ledger_infra_cache::CachePool;
use ledger_infra_db::RelationalClient;
use tower::ServiceExt;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn health_endpoint_requires_no_authentication() {
    let database_client = RelationalClient::connect(
        "file::mem_kernel_integrity_v1?mode=memory&cache=shared",
        None,
    )
    .await
    .expect("in-memory relational client");
    let cache_pool = CachePool::connect(&redis_url()).expect("redis pool");
    let state = AppState::new(database_client, cache_pool, GatewayConfig::default());
    let app = build_router(state);

    let response = app.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn public_and_internal_planes_reject_each_others_credentials() {
    let database_client = RelationalClient::connect(
        "file::mem_kernel_integrity_v2?mode=memory&cache=shared",
        None,
    )
    .await
    .expect("in-memory relational client");
    let cache_pool = CachePool::connect(&redis_url()).expect("redis pool");
    let state = AppState::new(database_client, cache_pool, GatewayConfig::default());
    let app = build_router(state);

    // An internal secret presented where the public plane expects an api key is not an api key.
    let public_with_internal_secret = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/leaderboards")
                .header("X-Internal-Secret", "test-internal-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(public_with_internal_secret.status(), StatusCode::UNAUTHORIZED);

    // An api key presented where the internal plane expects the shared secret is not the secret.
    let internal_with_api_key = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tenants")
                .header("content-type", "application/json")
                .header("X-Api-Key", "ak_whatever")
                .body(Body::from(r#"{"name":"x","email":"x@x.test"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(internal_with_api_key.status(), StatusCode::UNAUTHORIZED);
}
