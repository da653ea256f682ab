mod common;

use common::test_client::{WsTestClient, create_clients};
use common::test_server::create_test_server;

use serde_json::{Value, json};
use tokio::time::{Duration, sleep, timeout};

#[tokio::test]
async fn given_two_clients_when_broadcast_then_both_receive() {
    // Given
    let server = create_test_server();
    let mut clients = create_clients(&server.server, 2).await;
    sleep(Duration::from_millis(100)).await;

    // When
    let payload = json!({"type": "update", "seq": 1});
    let delivered = server.app_state.hub.broadcast(&payload, None).unwrap();

    // Then
    assert_eq!(delivered, 2);
    for client in &mut clients {
        let text = client.receive_text().await;
        let received: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(received, payload);
    }
}

#[tokio::test]
async fn given_excluded_client_when_broadcast_then_not_delivered_to_it() {
    // Given - A single client, excluded from its own broadcast
    let server = create_test_server();
    let mut client = WsTestClient::connect(&server.server).await;
    sleep(Duration::from_millis(100)).await;

    let live = server.app_state.hub.live_set();
    let id = live.iter().next().unwrap().id().clone();

    // When
    let delivered = server
        .app_state
        .hub
        .broadcast(&json!({"type": "update"}), Some(&id))
        .unwrap();

    // Then
    assert_eq!(delivered, 0);
    let nothing = timeout(Duration::from_millis(300), client.receive_text()).await;
    assert!(nothing.is_err(), "excluded client must not receive the frame");

    client.close().await;
}

#[tokio::test]
async fn given_client_disconnects_when_broadcast_then_delivered_to_remaining() {
    // Given
    let server = create_test_server();
    let mut clients = create_clients(&server.server, 2).await;
    sleep(Duration::from_millis(100)).await;

    // When - One client leaves before the broadcast
    clients.remove(0).close().await;
    sleep(Duration::from_millis(200)).await;

    let delivered = server
        .app_state
        .hub
        .broadcast(&json!({"type": "update", "seq": 2}), None)
        .unwrap();

    // Then
    assert_eq!(delivered, 1);
    let text = clients[0].receive_text().await;
    assert!(text.contains("update"));
}

#[tokio::test]
async fn given_consecutive_broadcasts_when_received_then_order_preserved() {
    // Given
    let server = create_test_server();
    let mut client = WsTestClient::connect(&server.server).await;
    sleep(Duration::from_millis(100)).await;

    // When - Frames queue in publish order per connection
    for seq in 0..5 {
        server
            .app_state
            .hub
            .broadcast(&json!({"seq": seq}), None)
            .unwrap();
    }

    // Then
    for seq in 0..5 {
        let text = client.receive_text().await;
        let received: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(received["seq"], seq);
    }

    client.close().await;
}
