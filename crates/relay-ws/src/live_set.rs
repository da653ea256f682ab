use crate::{ClientHandle, ClientId};

use std::collections::HashMap;
use std::sync::Arc;

/// Copy-on-write snapshot of the hub's live connections.
///
/// Published by the hub control loop after every membership change. Cloning
/// is one `Arc` bump; the underlying map is never mutated after publication,
/// so readers iterate it without any synchronization.
#[derive(Debug, Clone, Default)]
pub struct LiveSet {
    clients: Arc<HashMap<ClientId, ClientHandle>>,
    closed: bool,
}

impl LiveSet {
    pub(crate) fn new(clients: Arc<HashMap<ClientId, ClientHandle>>) -> Self {
        Self {
            clients,
            closed: false,
        }
    }

    /// The final snapshot: empty and marked closed.
    pub(crate) fn closed() -> Self {
        Self {
            clients: Arc::new(HashMap::new()),
            closed: true,
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    pub fn get(&self, id: &ClientId) -> Option<&ClientHandle> {
        self.clients.get(id)
    }

    /// Iterate over live handles in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &ClientHandle> {
        self.clients.values()
    }

    /// True once the hub has shut down; no further admissions will succeed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
