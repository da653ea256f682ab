mod common;

use common::test_client::WsTestClient;
use common::test_server::create_test_server;

use serde_json::Value;
use tokio::time::{Duration, sleep};

#[tokio::test]
async fn given_connected_client_when_health_checked_then_healthy_with_count() {
    // Given
    let server = create_test_server();
    let _client = WsTestClient::connect(&server.server).await;
    sleep(Duration::from_millis(100)).await;

    // When
    let response = server.server.get("/health").await;

    // Then
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connections"], 1);
    assert_eq!(body["components"]["websocket"], "operational");
}

#[tokio::test]
async fn given_running_server_when_liveness_checked_then_ok() {
    let server = create_test_server();

    let response = server.server.get("/live").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn given_running_server_when_readiness_checked_then_ready() {
    let server = create_test_server();

    let response = server.server.get("/ready").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "Ready");
}

#[tokio::test]
async fn given_connected_client_when_metrics_scraped_then_hub_metrics_present() {
    // Given - A connection so the hub counters exist in the registry
    let server = create_test_server();
    let _client = WsTestClient::connect(&server.server).await;
    sleep(Duration::from_millis(100)).await;

    // When
    let response = server.server.get("/metrics").await;

    // Then
    response.assert_status_ok();
    assert!(response.text().contains("relay_ws_connections"));
}
