#![allow(dead_code)]

use relay_server::build_router;
use relay_ws::{AppState, ConnectionConfig, ConnectionLimits, Hub, Metrics, ShutdownCoordinator};

use std::net::SocketAddr;
use std::sync::OnceLock;

use axum::Router;
use axum_test::TestServer;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Configuration for test server instances
#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub max_connections: usize,
    pub connection: ConnectionConfig,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            max_connections: 100,
            connection: ConnectionConfig::default(),
        }
    }
}

impl TestServerConfig {
    /// Create config with strict connection limits (for limit tests)
    pub fn with_strict_limits() -> Self {
        Self {
            max_connections: 2,
            ..Default::default()
        }
    }

    /// Create config with second-scale heartbeat deadlines (for liveness tests)
    pub fn with_fast_heartbeat() -> Self {
        Self {
            connection: ConnectionConfig {
                heartbeat_interval_secs: 1,
                heartbeat_timeout_secs: 2,
                write_timeout_secs: 1,
                ..ConnectionConfig::default()
            },
            ..Default::default()
        }
    }
}

/// Test server with access to AppState for testing
pub struct TestServerWithState {
    pub server: TestServer,
    pub app_state: AppState,
}

/// Create a TestServer with default configuration
pub fn create_test_server() -> TestServerWithState {
    create_test_server_with_config(TestServerConfig::default())
}

/// Create a TestServer with custom configuration
///
/// Uses the HTTP transport so the peer address extractor sees a real
/// socket, the same way the production listener is served.
pub fn create_test_server_with_config(config: TestServerConfig) -> TestServerWithState {
    let (app, app_state) = create_app(config);
    let server = TestServer::builder()
        .http_transport()
        .build(app.into_make_service_with_connect_info::<SocketAddr>())
        .expect("Failed to create test server");

    TestServerWithState { server, app_state }
}

/// Build the Axum Router with AppState
fn create_app(config: TestServerConfig) -> (Router, AppState) {
    let shutdown = ShutdownCoordinator::new();
    let metrics = Metrics::new();

    let hub = Hub::new(
        ConnectionLimits {
            max_total: config.max_connections,
        },
        metrics.clone(),
        shutdown.subscribe_guard(),
    );

    let app_state = AppState::new(hub, metrics, shutdown, config.connection);
    let router = build_router(app_state.clone(), test_metrics_handle());

    (router, app_state)
}

/// The global recorder can only be installed once per test binary.
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
