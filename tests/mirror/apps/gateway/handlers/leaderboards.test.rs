// [tests/mirror/apps/gateway/handlers/leaderboards.test.rs]
/*!
 * =================================================================
 * APARATO: LEADERBOARD HANDLERS TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-APP-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE CRUD Y CONSULTAS DE RANKING (§4.4)
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

fn public_json(method: &str, uri: &str, api_key: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Api-Key", api_key)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn public_get(uri: &str, api_key: &str) -> Request<Body> {
    Request::builder().uri(uri).header("X-Api-Key", api_key).body(Body::empty()).unwrap()
}

/// Provisions a tenant, project and api key, returning the plaintext key.
async fn provision_key(app: &Router, suffix: &str) -> String {
    let tenant = body_json(
        app.clone()
            .oneshot(internal_json(
                "POST",
                "/tenants",
                json!({"name": format!("tenant-{}", suffix), "email": format!("{}@boards.test", suffix)}),
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
    key["plaintext"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn create_leaderboard_is_rejected_once_the_free_plan_quota_is_exhausted() {
    let app = test_router("boards_v1").await;
    let api_key = provision_key(&app, "b1").await;

    // quota_limits(Free).leaderboards == 5
    for n in 0..5 {
        let response = app
            .clone()
            .oneshot(public_json(
                "POST",
                "/leaderboards",
                &api_key,
                json!({"name": format!("board-{}", n), "sortOrder": "desc", "updateMode": "best"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "leaderboard {n} should be within quota");
    }

    let sixth = app
        .clone()
        .oneshot(public_json(
            "POST",
            "/leaderboards",
            &api_key,
            json!({"name": "board-overflow", "sortOrder": "desc", "updateMode": "best"}),
        ))
        .await
        .unwrap();
    assert_eq!(sixth.status(), StatusCode::TOO_MANY_REQUESTS);

    let list_response = app.oneshot(public_get("/leaderboards", &api_key)).await.unwrap();
    assert_eq!(list_response.status(), StatusCode::OK);
    let list = body_json(list_response).await;
    assert_eq!(list.as_array().unwrap().len(), 5);
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn update_leaderboard_resyncs_metadata_and_top_reflects_scores() {
    let app = test_router("boards_v2").await;
    let api_key = provision_key(&app, "b2").await;

    let created = body_json(
        app.clone()
            .oneshot(public_json(
                "POST",
                "/leaderboards",
                &api_key,
                json!({"name": "weekly", "sortOrder": "desc", "updateMode": "best"}),
            ))
            .await
            .unwrap(),
    )
    .await;
    let leaderboard_id = created["id"].as_str().unwrap().to_string();

    let renamed = app
        .clone()
        .oneshot(public_json(
            "PUT",
            &format!("/leaderboards/{}", leaderboard_id),
            &api_key,
            json!({"name": "weekly-renamed"}),
        ))
        .await
        .unwrap();
    assert_eq!(renamed.status(), StatusCode::OK);
    let renamed_body = body_json(renamed).await;
    assert_eq!(renamed_body["name"], "weekly-renamed");

    for (user, score) in [("alice", 50.0), ("bob", 90.0), ("carol", 70.0)] {
        let response = app
            .clone()
            .oneshot(public_json(
                "POST",
                "/scores",
                &api_key,
                json!({"leaderboardId": leaderboard_id, "userId": user, "score": score}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let top_response = app
        .clone()
        .oneshot(public_get(&format!("/leaderboards/{}/top?limit=2", leaderboard_id), &api_key))
        .await
        .unwrap();
    assert_eq!(top_response.status(), StatusCode::OK);
    let top = body_json(top_response).await;
    let entries = top["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["userId"], "bob");
    assert_eq!(entries[1]["userId"], "carol");

    let rank_response = app
        .oneshot(public_get(
            &format!("/leaderboards/{}/rank/carol?withNeighbors=true&neighborCount=1", leaderboard_id),
            &api_key,
        ))
        .await
        .unwrap();
    assert_eq!(rank_response.status(), StatusCode::OK);
    let rank = body_json(rank_response).await;
    assert_eq!(rank["rank"], 2);
    assert!(rank["neighbors"].is_object(), "withNeighbors=true must populate the neighbors field");
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn delete_leaderboard_purges_ranking_data() {
    let app = test_router("boards_v3").await;
    let api_key = provision_key(&app, "b3").await;

    let created = body_json(
        app.clone()
            .oneshot(public_json(
                "POST",
                "/leaderboards",
                &api_key,
                json!({"name": "to-delete", "sortOrder": "asc", "updateMode": "increment"}),
            ))
            .await
            .unwrap(),
    )
    .await;
    let leaderboard_id = created["id"].as_str().unwrap().to_string();

    let delete_response = app
        .clone()
        .oneshot(public_json(
            "DELETE",
            &format!("/leaderboards/{}", leaderboard_id),
            &api_key,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(delete_response.status(), StatusCode::OK);

    // The leaderboard no longer resolves as an owned leaderboard for this project.
    let top_after_delete = app
        .oneshot(public_get(&format!("/leaderboards/{}/top", leaderboard_id), &api_key))
        .await
        .unwrap();
    assert_eq!(top_after_delete.status(), StatusCode::NOT_FOUND);
}
