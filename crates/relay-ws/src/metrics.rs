use metrics::{counter, gauge};

/// Metrics collector for hub and connection operations
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self { prefix: "relay_ws" }
    }

    /// Record a client admitted to the live set
    pub fn connection_admitted(&self, live: usize) {
        counter!(format!("{}.connections.admitted", self.prefix)).increment(1);
        gauge!(format!("{}.connections.live", self.prefix)).set(live as f64);
    }

    /// Record a client removed from the live set
    pub fn connection_removed(&self, live: usize) {
        counter!(format!("{}.connections.removed", self.prefix)).increment(1);
        gauge!(format!("{}.connections.live", self.prefix)).set(live as f64);
    }

    /// Record connection teardown and why
    pub fn connection_closed(&self, reason: &str) {
        counter!(format!("{}.connections.closed", self.prefix)).increment(1);
        counter!(format!("{}.connections.closed.{}", self.prefix, reason)).increment(1);
    }

    /// Record a slow or dead client evicted by the broadcast path
    pub fn client_evicted(&self, reason: &str) {
        counter!(format!("{}.connections.evicted", self.prefix)).increment(1);
        counter!(format!("{}.connections.evicted.{}", self.prefix, reason)).increment(1);
    }

    /// Record frame received from a client
    pub fn frame_received(&self) {
        counter!(format!("{}.frames.received", self.prefix)).increment(1);
    }

    /// Record frame written to a client
    pub fn frame_sent(&self) {
        counter!(format!("{}.frames.sent", self.prefix)).increment(1);
    }

    /// Record frame dropped on a full outbound queue
    pub fn frame_dropped(&self) {
        counter!(format!("{}.frames.dropped", self.prefix)).increment(1);
    }

    /// Record a broadcast fan-out and how many clients it reached
    pub fn broadcast_published(&self, recipients: usize) {
        counter!(format!("{}.broadcast.published", self.prefix)).increment(1);
        gauge!(format!("{}.broadcast.recipients", self.prefix)).set(recipients as f64);
    }

    /// Record error occurrence
    pub fn error_occurred(&self, error_type: &str) {
        counter!(format!("{}.errors.total", self.prefix)).increment(1);
        counter!(format!("{}.errors.{}", self.prefix, error_type)).increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
