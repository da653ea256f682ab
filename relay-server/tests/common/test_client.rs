use axum::body::Bytes;
use axum_test::{TestServer, TestWebSocket, WsMessage};

/// WebSocket test client wrapper
pub struct WsTestClient {
    ws: TestWebSocket,
}

impl WsTestClient {
    /// Connect to the WebSocket endpoint
    pub async fn connect(server: &TestServer) -> Self {
        let ws = server.get_websocket("/ws").await.into_websocket().await;

        Self { ws }
    }

    /// Send text message
    pub async fn send_text(&mut self, text: impl std::fmt::Display) {
        self.ws.send_text(text).await;
    }

    /// Receive text message
    pub async fn receive_text(&mut self) -> String {
        self.ws.receive_text().await
    }

    /// Send a ping frame (counts as liveness on the server side)
    pub async fn send_ping(&mut self) {
        self.ws.send_message(WsMessage::Ping(Bytes::new())).await;
    }

    /// Receive the next raw frame
    pub async fn receive_message(&mut self) -> WsMessage {
        self.ws.receive_message().await
    }

    /// Close the WebSocket connection
    pub async fn close(self) {
        self.ws.close().await;
    }

    /// Get mutable reference to underlying TestWebSocket for advanced usage
    pub fn ws_mut(&mut self) -> &mut TestWebSocket {
        &mut self.ws
    }
}

/// Create multiple connected clients (helper for broadcast tests)
pub async fn create_clients(server: &TestServer, count: usize) -> Vec<WsTestClient> {
    let mut clients = Vec::with_capacity(count);
    for _ in 0..count {
        clients.push(WsTestClient::connect(server).await);
    }
    clients
}
