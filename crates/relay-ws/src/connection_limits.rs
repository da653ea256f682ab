/// Admission capacity for the hub
#[derive(Debug, Clone)]
pub struct ConnectionLimits {
    /// Maximum total connections admitted to the live set
    pub max_total: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self { max_total: 1000 }
    }
}
