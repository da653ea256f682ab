use relay_ws::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /health - Health check with component status and live connection count
pub async fn health(State(state): State<AppState>) -> Response {
    let connections = state.hub.connection_count();
    let draining = state.shutdown.is_shutdown();

    let health = json!({
        "status": if draining { "draining" } else { "healthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "components": {
            "websocket": if draining { "draining" } else { "operational" },
        },
        "connections": connections,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - Kubernetes liveness probe (is the process alive?)
pub async fn liveness() -> Response {
    // Simple check: if we can respond, we're alive
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - Kubernetes readiness probe (ready to accept traffic?)
pub async fn readiness(State(state): State<AppState>) -> Response {
    // A draining server must stop receiving new traffic before it stops
    // answering probes.
    if state.shutdown.is_shutdown() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Draining").into_response();
    }

    (StatusCode::OK, "Ready").into_response()
}
