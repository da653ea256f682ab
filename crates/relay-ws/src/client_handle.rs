use crate::ClientId;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Outcome of a non-blocking push onto a client's outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Frame queued for delivery.
    Queued,
    /// Queue full; the frame was dropped for this client (drop-newest).
    Full,
    /// Receive half gone; the connection is tearing down.
    Closed,
}

/// Live-set entry for one connected client.
///
/// Holds the sender half of the client's bounded outbound queue. Clones share
/// the drop counter, so drops observed through any snapshot accumulate
/// against the same connection.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    connected_at: DateTime<Utc>,
    outbound: mpsc::Sender<Message>,
    drops: Arc<AtomicU64>,
}

impl ClientHandle {
    pub fn new(id: ClientId, outbound: mpsc::Sender<Message>) -> Self {
        Self {
            id,
            connected_at: Utc::now(),
            outbound,
            drops: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Queue a frame without blocking.
    ///
    /// A full queue drops the frame and records the drop against this
    /// connection; the caller decides when the accumulated drops warrant
    /// eviction.
    pub fn try_push(&self, frame: Message) -> PushOutcome {
        match self.outbound.try_send(frame) {
            Ok(()) => PushOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.drops.fetch_add(1, Ordering::Relaxed);
                PushOutcome::Full
            }
            Err(mpsc::error::TrySendError::Closed(_)) => PushOutcome::Closed,
        }
    }

    /// Total frames dropped against this connection since admission.
    pub fn total_drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    /// Whether `sender` feeds this entry's outbound queue. Identities can
    /// recur across reconnects from the same peer address; the queue is
    /// what distinguishes the connection behind an entry.
    pub fn same_queue(&self, sender: &mpsc::Sender<Message>) -> bool {
        self.outbound.same_channel(sender)
    }

    pub(crate) fn queue_sender(&self) -> mpsc::Sender<Message> {
        self.outbound.clone()
    }
}
