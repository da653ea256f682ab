//! Administrative endpoints for server management.

use relay_ws::AppState;

use axum::{Json, extract::State, http::StatusCode};
use log::{info, warn};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub struct ShutdownResponse {
    pub status: String,
    pub message: String,
}

/// Graceful shutdown endpoint.
///
/// Notifies connected clients, then signals the shutdown coordinator. The
/// response goes out before the listener stops, so callers see the 202.
pub async fn shutdown_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ShutdownResponse>), (StatusCode, String)> {
    info!("Graceful shutdown requested via HTTP");

    let notice = json!({"type": "server.shutdown"});
    match state.hub.broadcast(&notice, None) {
        Ok(notified) => info!("Shutdown notice sent to {notified} clients"),
        Err(e) => warn!("Shutdown notice failed: {e}"),
    }

    state.shutdown.shutdown();

    Ok((
        StatusCode::ACCEPTED,
        Json(ShutdownResponse {
            status: "accepted".to_string(),
            message: "Server shutting down".to_string(),
        }),
    ))
}
