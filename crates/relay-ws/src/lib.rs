pub mod app_state;
pub mod client_handle;
pub mod client_id;
pub mod connection_config;
pub mod connection_limits;
pub mod error;
pub mod hub;
pub mod live_set;
pub mod metrics;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod web_socket_client;

pub use app_state::{AppState, handler};
pub use client_handle::{ClientHandle, PushOutcome};
pub use client_id::ClientId;
pub use connection_config::ConnectionConfig;
pub use connection_limits::ConnectionLimits;
pub use error::{HubError, Result};
pub use hub::{Hub, MAX_OUTBOUND_DROPS};
pub use live_set::LiveSet;
pub use metrics::Metrics;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use web_socket_client::WebSocketClient;

#[cfg(test)]
mod tests;
