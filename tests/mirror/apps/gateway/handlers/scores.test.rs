// [tests/mirror/apps/gateway/handlers/scores.test.rs]
/*!
 * =================================================================
 * APARATO: SCORES HANDLERS TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-APP-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE `UpdateScore` Y `BatchUpdateScore` (§4.3)
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

/// Provisions a tenant, project, api key and leaderboard, returning the
/// plaintext key and the new leaderboard's id.
async fn provision(app: &Router, suffix: &str) -> (String, String) {
    let tenant = body_json(
        app.clone()
            .oneshot(internal_json(
                "POST",
                "/tenants",
                json!({"name": format!("tenant-{}", suffix), "email": format!("{}@scores.test", suffix)}),
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
            .oneshot(internal_json(
                "POST",
                "/api-keys",
                json!({"projectId": project_id, "name": "svc"}),
            ))
            .await
            .unwrap(),
    )
    .await;
    let plaintext = key["plaintext"].as_str().unwrap().to_string();

    let leaderboard = body_json(
        app.clone()
            .oneshot(public_json(
                "POST",
                "/leaderboards",
                &plaintext,
                json!({"name": "weekly", "sortOrder": "desc", "updateMode": "best"}),
            ))
            .await
            .unwrap(),
    )
    .await;
    let leaderboard_id = leaderboard["id"].as_str().unwrap().to_string();

    (plaintext, leaderboard_id)
}

/// Crea un leaderboard adicional bajo una key ya provisionada, con el
/// modo de actualización dado.
async fn provision_leaderboard(app: &Router, api_key: &str, name: &str, update_mode: &str) -> String {
    let leaderboard = body_json(
        app.clone()
            .oneshot(public_json(
                "POST",
                "/leaderboards",
                api_key,
                json!({"name": name, "sortOrder": "desc", "updateMode": update_mode}),
            ))
            .await
            .unwrap(),
    )
    .await;
    leaderboard["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn update_score_then_rank_reflects_the_write() {
    let app = test_router("scores_v1").await;
    let (api_key, leaderboard_id) = provision(&app, "s1").await;

    let response = app
        .clone()
        .oneshot(public_json(
            "POST",
            "/scores",
            &api_key,
            json!({"leaderboardId": leaderboard_id, "userId": "player-a", "score": 100.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let update = body_json(response).await;
    assert_eq!(update["finalScore"], 100.0);
    assert_eq!(update["rank"], 1);

    let rank_response = app
        .oneshot(
            Request::builder()
                .uri(format!("/leaderboards/{}/rank/player-a", leaderboard_id))
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(rank_response.status(), StatusCode::OK);
    let rank = body_json(rank_response).await;
    assert_eq!(rank["rank"], 1);
    assert_eq!(rank["score"], 100.0);
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn best_mode_keeps_the_higher_score_on_a_worse_update() {
    let app = test_router("scores_v2").await;
    let (api_key, leaderboard_id) = provision(&app, "s2").await;

    app.clone()
        .oneshot(public_json(
            "POST",
            "/scores",
            &api_key,
            json!({"leaderboardId": leaderboard_id, "userId": "player-b", "score": 500.0}),
        ))
        .await
        .unwrap();

    let worse_update = app
        .clone()
        .oneshot(public_json(
            "POST",
            "/scores",
            &api_key,
            json!({"leaderboardId": leaderboard_id, "userId": "player-b", "score": 10.0}),
        ))
        .await
        .unwrap();
    let update = body_json(worse_update).await;
    assert_eq!(update["finalScore"], 500.0, "best mode (sortOrder=desc) must not overwrite with a lower score");
}

/// §8 escenario 6: un lote con tres entradas contra tres leaderboards de
/// modos distintos (`replace`, `increment`, `best`) debe aplicar cada
/// modo según su semántica propia dentro de una única pasada pipelinada,
/// y devolver un resultado por entrada.
#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn batch_update_score_applies_each_leaderboards_own_mode() {
    let app = test_router("scores_v3").await;
    let (api_key, _seed_leaderboard) = provision(&app, "s3").await;

    let replace_lb = provision_leaderboard(&app, &api_key, "replace-board", "replace").await;
    let increment_lb = provision_leaderboard(&app, &api_key, "increment-board", "increment").await;
    let best_lb = provision_leaderboard(&app, &api_key, "best-board", "best").await;

    // Siembra un estado previo en cada leaderboard para que el modo
    // importe: replace debe sobrescribir, increment debe sumar, y best
    // (sortOrder=desc) debe ignorar una actualización peor.
    for (leaderboard_id, score) in [(&replace_lb, 50.0), (&increment_lb, 10.0), (&best_lb, 100.0)] {
        let seed = app
            .clone()
            .oneshot(public_json(
                "POST",
                "/scores",
                &api_key,
                json!({"leaderboardId": leaderboard_id, "userId": "racer", "score": score}),
            ))
            .await
            .unwrap();
        assert_eq!(seed.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(public_json(
            "POST",
            "/scores/batch-update",
            &api_key,
            json!({"updates": [
                {"leaderboardId": replace_lb, "userId": "racer", "score": 80.0},
                {"leaderboardId": increment_lb, "userId": "racer", "score": 5.0},
                {"leaderboardId": best_lb, "userId": "racer", "score": 40.0},
            ]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let results = body_json(response).await;
    let entries = results.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["finalScore"], 80.0, "replace mode overwrites unconditionally");
    assert_eq!(entries[1]["finalScore"], 15.0, "increment mode adds to the prior score");
    assert_eq!(entries[2]["finalScore"], 100.0, "best mode (desc) keeps the higher prior score");
}

#[tokio::test]
#[ignore = "requires a reachable redis instance (REDIS_URL)"]
async fn update_score_against_a_foreign_leaderboard_is_forbidden() {
    let app = test_router("scores_v4").await;
    let (_api_key_a, leaderboard_id_a) = provision(&app, "s4a").await;
    let (api_key_b, _leaderboard_id_b) = provision(&app, "s4b").await;

    let response = app
        .oneshot(public_json(
            "POST",
            "/scores",
            &api_key_b,
            json!({"leaderboardId": leaderboard_id_a, "userId": "intruder", "score": 1.0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
