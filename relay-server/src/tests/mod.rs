
use relay_ws::{AppState, ConnectionConfig, ConnectionLimits, Hub, Metrics, ShutdownCoordinator};

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Must be called from within a tokio runtime; the hub spawns its control
/// loop on creation.
fn create_test_state() -> AppState {
    let shutdown = ShutdownCoordinator::new();
    let hub = Hub::new(
        ConnectionLimits { max_total: 100 },
        Metrics::new(),
        shutdown.subscribe_guard(),
    );

    AppState::new(hub, Metrics::new(), shutdown, ConnectionConfig::default())
}

/// The global recorder can only be installed once per process.
fn test_metrics_handle() -> PrometheusHandle {
    static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

    RECORDER
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .expect("Failed to install Prometheus recorder")
        })
        .clone()
}
