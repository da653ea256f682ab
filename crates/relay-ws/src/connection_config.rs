/// Per-connection timing and buffering knobs
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Outbound queue capacity (bounded to absorb bursts without ever
    /// blocking a broadcaster)
    pub send_buffer_size: usize,
    /// Heartbeat ping interval in seconds
    pub heartbeat_interval_secs: u64,
    /// Idle deadline in seconds; a peer silent this long is dropped
    pub heartbeat_timeout_secs: u64,
    /// Per-frame write deadline in seconds
    pub write_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            send_buffer_size: 100,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 60,
            write_timeout_secs: 10,
        }
    }
}
