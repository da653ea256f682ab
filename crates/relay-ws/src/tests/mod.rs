mod shutdown;

use crate::{ConnectionLimits, Hub, Metrics, ShutdownCoordinator};

use std::net::SocketAddr;

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Hub wired to a fresh coordinator. Callers must keep the coordinator
/// alive for the duration of the test; dropping it counts as shutdown.
fn hub_with_capacity(max_total: usize) -> (Hub, ShutdownCoordinator) {
    let coordinator = ShutdownCoordinator::new();
    let hub = Hub::new(
        ConnectionLimits { max_total },
        Metrics::default(),
        coordinator.subscribe_guard(),
    );
    (hub, coordinator)
}
