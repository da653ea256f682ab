use crate::{admin, health};

use relay_ws::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};

/// Assemble the route table shared by the binary and the test harness.
pub fn build_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/ws", get(relay_ws::handler))
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        // The recorder handle renders the Prometheus scrape text on demand
        .route(
            "/metrics",
            get(move || std::future::ready(metrics_handle.render())),
        )
        .route("/admin/shutdown", post(admin::shutdown_handler))
        .with_state(state)
        // Browser clients connect cross-origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
