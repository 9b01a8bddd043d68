// [tests/mirror/apps/gateway/handlers/billing.test.rs]
/*!
 * =================================================================
 * APARATO: BILLING HANDLERS TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-APP-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL CICLO DE SUSCRIPCIONES Y `UsageCheck` (§4.6)
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

fn internal_get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).header("X-Internal-Secret", "test-internal-secret").body(Body::empty()).unwrap()
}

async fn provision_tenant(app: &Router, suffix: &str) -> String {
    let tenant = body_json(
        app.clone()
            .oneshot(internal_json(
                "POST",
                "/tenants",
                json!({"name": format!("tenant-{}", suffix), "email": format!("{}@billing.test", suffix)}),
            ))
            .await
            .unwrap(),
    )
    .await;
    tenant["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn create_subscription_for_unknown_tenant_is_not_found() {
    let app = test_router("billing_v1").await;

    let response = app
        .oneshot(internal_json(
            "POST",
            "/subscriptions",
            json!({"tenantId": uuid::Uuid::new_v4().to_string(), "planType": "free"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn subscription_lifecycle_create_fetch_cancel() {
    let app = test_router("billing_v2").await;
    let tenant_id = provision_tenant(&app, "b2").await;

    let created = app
        .clone()
        .oneshot(internal_json("POST", "/subscriptions", json!({"tenantId": tenant_id, "planType": "pro"})))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);
    let subscription = body_json(created).await;
    assert_eq!(subscription["planType"], "pro");
    let subscription_id = subscription["id"].as_str().unwrap().to_string();

    let fetched = app
        .clone()
        .oneshot(internal_get(&format!("/subscriptions/tenant/{}", tenant_id)))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    let fetched_body = body_json(fetched).await;
    assert_eq!(fetched_body["id"], subscription_id);

    let cancelled = app
        .clone()
        .oneshot(internal_json(
            "PATCH",
            &format!("/subscriptions/{}/cancel", subscription_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::OK);
    let cancelled_body = body_json(cancelled).await;
    assert_eq!(
        cancelled_body["status"], "cancelled",
        "atPeriodEnd defaulting to false means the subscription is cancelled immediately"
    );

    let after_cancel = app
        .oneshot(internal_get(&format!("/subscriptions/tenant/{}", tenant_id)))
        .await
        .unwrap();
    assert_eq!(
        after_cancel.status(),
        StatusCode::NOT_FOUND,
        "a cancelled subscription is no longer the tenant's active subscription"
    );
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn usage_check_aggregates_leaderboards_and_keys_across_all_projects() {
    let app = test_router("billing_v3").await;
    let tenant_id = provision_tenant(&app, "b3").await;

    let subscription = body_json(
        app.clone()
            .oneshot(internal_json("POST", "/subscriptions", json!({"tenantId": tenant_id, "planType": "free"})))
            .await
            .unwrap(),
    )
    .await;
    let subscription_id = subscription["id"].as_str().unwrap().to_string();

    // Two projects under the same tenant, one leaderboard-owning api key each.
    for project_suffix in ["alpha", "beta"] {
        let project = body_json(
            app.clone()
                .oneshot(internal_json(
                    "POST",
                    "/projects",
                    json!({"tenantId": tenant_id, "name": project_suffix}),
                ))
                .await
                .unwrap(),
        )
        .await;
        let project_id = project["id"].as_str().unwrap().to_string();

        let key = body_json(
            app.clone()
                .oneshot(internal_json(
                    "POST",
                    "/api-keys",
                    json!({"projectId": project_id, "name": format!("{}-key", project_suffix)}),
                ))
                .await
                .unwrap(),
        )
        .await;
        let plaintext = key["plaintext"].as_str().unwrap().to_string();

        let leaderboard_request = Request::builder()
            .method("POST")
            .uri("/leaderboards")
            .header("content-type", "application/json")
            .header("X-Api-Key", &plaintext)
            .body(Body::from(
                json!({"name": format!("{}-board", project_suffix), "sortOrder": "desc", "updateMode": "best"})
                    .to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(leaderboard_request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let usage_response = app
        .oneshot(internal_get(&format!("/subscriptions/{}/usage-check", subscription_id)))
        .await
        .unwrap();
    assert_eq!(usage_response.status(), StatusCode::OK);
    let usage = body_json(usage_response).await;
    assert_eq!(usage["leaderboards"]["current"], 2);
    assert_eq!(usage["apiKeys"]["current"], 2);
    assert_eq!(usage["withinLimit"], true, "2 of 5 free-plan leaderboards must still be within limit");
}
