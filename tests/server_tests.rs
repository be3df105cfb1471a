//! End-to-end tests over a real TCP listener.

use std::net::SocketAddr;
use std::sync::Arc;

use cache_gateway::{create_router, AppState, Config, KeyValueClient, MemoryStore, RedisClient};
use serde_json::{json, Value};

async fn spawn_server(store: Arc<dyn KeyValueClient>) -> SocketAddr {
    let state = AppState::new(store, &Config::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    addr
}

async fn exercise_lifecycle(addr: SocketAddr) {
    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let response = client
        .post(format!("{}/api/cache", base))
        .json(&json!({"key": "e2e:user", "value": {"id": 7}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let response = client
        .get(format!("{}/api/cache/e2e:user", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["value"]["id"], 7);

    let response = client
        .delete(format!("{}/api/cache/e2e:user", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = client
        .get(format!("{}/api/cache/e2e:user", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lifecycle_over_http() {
    let addr = spawn_server(Arc::new(MemoryStore::new())).await;
    exercise_lifecycle(addr).await;
}

#[tokio::test]
async fn test_health_over_http() {
    let addr = spawn_server(Arc::new(MemoryStore::new())).await;

    let body: Value = reqwest::get(format!("http://{}/health/redis/simple", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "UP");
    assert_eq!(body["healthy"], true);
}

/// Requires a Redis server on 127.0.0.1:6379.
#[tokio::test]
#[ignore]
async fn test_lifecycle_against_live_redis() {
    let config = Config::default();
    let client = RedisClient::connect(&config.redis_url(), config.redis_timeout())
        .await
        .unwrap();
    let addr = spawn_server(Arc::new(client)).await;
    exercise_lifecycle(addr).await;
}
