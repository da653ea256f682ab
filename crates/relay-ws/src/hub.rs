use crate::{
    ClientHandle, ClientId, ConnectionLimits, HubError, LiveSet, Metrics, PushOutcome,
    Result as HubResult, ShutdownGuard,
};

use std::collections::HashMap;
use std::net::SocketAddr;
use std::panic::Location;
use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes};
use chrono::Utc;
use error_location::ErrorLocation;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};

/// Capacity of the admission and removal intake queues.
const INTAKE_QUEUE_SIZE: usize = 64;

/// Lifetime outbound drops after which a client is evicted as too slow.
pub const MAX_OUTBOUND_DROPS: u64 = 100;

/// Admission request submitted by the upgrade glue after a successful
/// handshake. The identity is assigned inside the control loop and returned
/// through the ack.
struct Admission {
    addr: SocketAddr,
    outbound: mpsc::Sender<Message>,
    ack: oneshot::Sender<HubResult<ClientId>>,
}

/// Removal request. Eviction from the broadcast path carries no ack.
///
/// `queue` pins the request to one connection: after a replace-on-admit the
/// identity alone would also match the replacement entry.
struct Removal {
    id: ClientId,
    queue: mpsc::Sender<Message>,
    ack: Option<oneshot::Sender<bool>>,
}

/// Handle to the connection hub.
///
/// The live set itself is owned by a single control-loop task. This handle
/// submits admissions and removals through the loop's intake queues and reads
/// membership only through the copy-on-write snapshot the loop publishes
/// after every change, so no caller can touch the map from outside the loop.
/// Cheap to clone and shareable across tasks.
#[derive(Clone)]
pub struct Hub {
    admissions: mpsc::Sender<Admission>,
    removals: mpsc::Sender<Removal>,
    live: watch::Receiver<LiveSet>,
    limits: ConnectionLimits,
    metrics: Metrics,
}

impl Hub {
    /// Create the hub and spawn its control loop.
    ///
    /// The loop runs until `shutdown` fires or every `Hub` handle is
    /// dropped, then drains its intake queues, publishes a final closed
    /// snapshot, and releases every connection's outbound queue.
    pub fn new(limits: ConnectionLimits, metrics: Metrics, shutdown: ShutdownGuard) -> Self {
        let (admissions_tx, admissions_rx) = mpsc::channel(INTAKE_QUEUE_SIZE);
        let (removals_tx, removals_rx) = mpsc::channel(INTAKE_QUEUE_SIZE);
        let (live_tx, live_rx) = watch::channel(LiveSet::default());

        tokio::spawn(control_loop(
            admissions_rx,
            removals_rx,
            live_tx,
            limits.clone(),
            metrics.clone(),
            shutdown,
        ));

        Self {
            admissions: admissions_tx,
            removals: removals_tx,
            live: live_rx,
            limits,
            metrics,
        }
    }

    /// Admit a connection into the live set.
    ///
    /// The identity is derived from the peer address inside the control
    /// loop. The call resolves only after the membership change has been
    /// published, so a broadcast issued afterwards observes the new client.
    pub async fn admit(
        &self,
        addr: SocketAddr,
        outbound: mpsc::Sender<Message>,
    ) -> HubResult<ClientId> {
        let (ack_tx, ack_rx) = oneshot::channel();
        let admission = Admission {
            addr,
            outbound,
            ack: ack_tx,
        };

        self.admissions
            .send(admission)
            .await
            .map_err(|_| HubError::hub_closed())?;

        ack_rx.await.map_err(|_| HubError::hub_closed())?
    }

    /// Remove a connection by identity and its own outbound queue.
    ///
    /// Returns true when an entry was removed. Removing a connection that is
    /// not live (already removed, never admitted, or the hub has shut down)
    /// is a no-op returning false, so racing teardown paths are harmless.
    /// The entry is removed only when `queue` still feeds it: a replaced
    /// connection tearing down late must not delete its replacement.
    pub async fn remove(&self, id: &ClientId, queue: &mpsc::Sender<Message>) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        let removal = Removal {
            id: id.clone(),
            queue: queue.clone(),
            ack: Some(ack_tx),
        };

        if self.removals.send(removal).await.is_err() {
            return false;
        }

        ack_rx.await.unwrap_or(false)
    }

    /// Serialize `message` once and queue it to every live client except
    /// `exclude`.
    ///
    /// Delivery is best-effort and per-connection independent: a slow
    /// client's full queue drops the frame for that client only, counting
    /// toward its eviction, and never blocks the caller or starves the
    /// rest. A serialization failure is returned without anything queued.
    /// Returns the number of clients the frame was queued to.
    pub fn broadcast<T: Serialize>(
        &self,
        message: &T,
        exclude: Option<&ClientId>,
    ) -> HubResult<usize> {
        let payload = serde_json::to_string(message)?;
        let frame = Message::Text(Utf8Bytes::from(payload));

        let snapshot = self.live.borrow().clone();
        let mut delivered = 0;

        for client in snapshot.iter() {
            if exclude.is_some_and(|skip| skip == client.id()) {
                continue;
            }

            match client.try_push(frame.clone()) {
                PushOutcome::Queued => delivered += 1,
                PushOutcome::Full => {
                    let drops = client.total_drops();
                    self.metrics.frame_dropped();
                    warn!(
                        "Dropped frame for slow client {} ({} drops total)",
                        client.id(),
                        drops
                    );
                    if drops >= MAX_OUTBOUND_DROPS {
                        self.evict(client, "slow");
                    }
                }
                PushOutcome::Closed => {
                    debug!("Outbound queue for {} already closed", client.id());
                    self.evict(client, "closed");
                }
            }
        }

        self.metrics.broadcast_published(delivered);

        Ok(delivered)
    }

    /// Number of clients in the current published snapshot.
    pub fn connection_count(&self) -> usize {
        self.live.borrow().len()
    }

    /// Current snapshot of the live set.
    pub fn live_set(&self) -> LiveSet {
        self.live.borrow().clone()
    }

    /// Advisory capacity check against the published snapshot. The control
    /// loop re-checks authoritatively at admission.
    pub fn at_capacity(&self) -> bool {
        self.live.borrow().len() >= self.limits.max_total
    }

    /// True once the final closed snapshot has been published.
    pub fn is_closed(&self) -> bool {
        self.live.borrow().is_closed()
    }

    /// Subscribe to live-set snapshots; every membership change publishes a
    /// new value.
    pub fn watch(&self) -> watch::Receiver<LiveSet> {
        self.live.clone()
    }

    /// Wait until the hub has fully shut down: control loop exited, final
    /// closed snapshot published, every outbound queue released.
    pub async fn closed(&self) {
        let mut live = self.live.clone();
        // An error means the control loop is gone entirely, which also
        // counts as closed.
        let _ = live.wait_for(|set| set.is_closed()).await;
    }

    /// Best-effort removal requested from the broadcast path. A full intake
    /// queue only delays eviction until a later broadcast.
    fn evict(&self, client: &ClientHandle, reason: &'static str) {
        let removal = Removal {
            id: client.id().clone(),
            queue: client.queue_sender(),
            ack: None,
        };
        if self.removals.try_send(removal).is_ok() {
            self.metrics.client_evicted(reason);
            info!("Evicting client {} ({})", client.id(), reason);
        }
    }
}

/// The single task that owns the live map. All membership mutation happens
/// here; everything else sees membership through the published snapshots.
async fn control_loop(
    mut admissions: mpsc::Receiver<Admission>,
    mut removals: mpsc::Receiver<Removal>,
    live: watch::Sender<LiveSet>,
    limits: ConnectionLimits,
    metrics: Metrics,
    mut shutdown: ShutdownGuard,
) {
    let mut clients: HashMap<ClientId, ClientHandle> = HashMap::new();

    debug!("Hub control loop started (max {} connections)", limits.max_total);

    loop {
        tokio::select! {
            admission = admissions.recv() => match admission {
                Some(admission) => {
                    handle_admission(&mut clients, &live, &limits, &metrics, admission)
                }
                None => break,
            },
            removal = removals.recv() => match removal {
                Some(removal) => handle_removal(&mut clients, &live, &metrics, removal),
                None => break,
            },
            _ = shutdown.wait() => break,
        }
    }

    // Refuse what raced with shutdown so no caller is left waiting on an ack.
    admissions.close();
    removals.close();

    while let Some(admission) = admissions.recv().await {
        let _ = admission.ack.send(Err(HubError::hub_closed()));
    }
    while let Some(removal) = removals.recv().await {
        handle_removal(&mut clients, &live, &metrics, removal);
    }

    let released = clients.len();
    clients.clear();
    // Replacing the last snapshot releases the map's queue senders, which
    // lets every send loop flush and close its transport.
    let _ = live.send_replace(LiveSet::closed());

    info!("Hub control loop stopped ({} connections released)", released);
}

fn handle_admission(
    clients: &mut HashMap<ClientId, ClientHandle>,
    live: &watch::Sender<LiveSet>,
    limits: &ConnectionLimits,
    metrics: &Metrics,
    admission: Admission,
) {
    if clients.len() >= limits.max_total {
        warn!(
            "Connection limit reached: {}/{}",
            clients.len(),
            limits.max_total
        );
        let _ = admission.ack.send(Err(HubError::ConnectionLimitExceeded {
            current: clients.len(),
            max: limits.max_total,
            location: ErrorLocation::from(Location::caller()),
        }));
        return;
    }

    let id = ClientId::from_addr(admission.addr);
    let handle = ClientHandle::new(id.clone(), admission.outbound);

    if clients.insert(id.clone(), handle).is_some() {
        // Peer address reuse. The stale entry leaves the live set here; its
        // connection is reaped by its own deadlines, and its late removal
        // request no longer matches the entry's queue.
        warn!("Admission for {} replaced an existing entry", id);
    }

    publish(clients, live);
    metrics.connection_admitted(clients.len());
    info!("Admitted client {} ({} total)", id, clients.len());

    let _ = admission.ack.send(Ok(id));
}

fn handle_removal(
    clients: &mut HashMap<ClientId, ClientHandle>,
    live: &watch::Sender<LiveSet>,
    metrics: &Metrics,
    removal: Removal,
) {
    // The queue must still match: a stale connection tearing down after a
    // replace-on-admit carries the old queue and must leave the
    // replacement's entry alone.
    let matches = clients
        .get(&removal.id)
        .is_some_and(|entry| entry.same_queue(&removal.queue));

    if matches {
        if let Some(entry) = clients.remove(&removal.id) {
            publish(clients, live);
            metrics.connection_removed(clients.len());
            let connected_secs = Utc::now()
                .signed_duration_since(entry.connected_at())
                .num_seconds();
            info!(
                "Removed client {} after {}s ({} remaining)",
                removal.id,
                connected_secs,
                clients.len()
            );
        }
    } else {
        debug!("Removal for {} matched no live entry", removal.id);
    }

    if let Some(ack) = removal.ack {
        let _ = ack.send(matches);
    }
}

fn publish(clients: &HashMap<ClientId, ClientHandle>, live: &watch::Sender<LiveSet>) {
    let _ = live.send_replace(LiveSet::new(Arc::new(clients.clone())));
}
