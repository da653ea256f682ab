use crate::{ConnectionConfig, Hub, Metrics, ShutdownCoordinator, WebSocketClient};

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::Response;
use log::{debug, error, warn};
use tokio::sync::mpsc;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
    pub metrics: Metrics,
    pub shutdown: ShutdownCoordinator,
    pub config: ConnectionConfig,
}

impl AppState {
    pub fn new(
        hub: Hub,
        metrics: Metrics,
        shutdown: ShutdownCoordinator,
        config: ConnectionConfig,
    ) -> Self {
        Self {
            hub,
            metrics,
            shutdown,
            config,
        }
    }
}

/// Upgrade entry point for `/ws`.
///
/// The capacity check here is advisory, refusing obviously doomed upgrades
/// with a 503 before the handshake; the hub re-checks authoritatively at
/// admission. Requires the router to be served with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the peer
/// address is available as the connection identity.
pub async fn handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Result<Response, StatusCode> {
    if state.hub.at_capacity() {
        warn!("Refusing upgrade from {addr}: at capacity");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    debug!("Upgrading connection from {addr}");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, addr, state)))
}

async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: AppState) {
    let (outbound_tx, outbound_rx) = mpsc::channel::<Message>(state.config.send_buffer_size);

    let id = match state.hub.admit(addr, outbound_tx.clone()).await {
        Ok(id) => id,
        Err(e) => {
            // Dropping the socket here closes the transport without a
            // handshake of our own; the peer sees an abnormal close.
            warn!("Admission refused for {addr}: {e}");
            state.metrics.error_occurred("admission_refused");
            return;
        }
    };

    let shutdown_guard = state.shutdown.subscribe_guard();
    let client = WebSocketClient::new(
        id.clone(),
        state.hub.clone(),
        state.config.clone(),
        state.metrics.clone(),
        outbound_tx,
    );

    if let Err(e) = client.handle(socket, outbound_rx, shutdown_guard).await {
        error!("Connection {id} error: {e}");
    }
}
