use crate::{ClientId, ConnectionConfig, Hub, HubError, Metrics, Result as HubResult, ShutdownGuard};

use std::panic::Location;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use error_location::ErrorLocation;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at, timeout};

/// Per-connection adapter between one WebSocket transport and the hub.
///
/// Owns the receive side of the socket; a spawned task owns the send side
/// and drains the connection's outbound queue. The adapter leaves the hub by
/// exactly one path (peer close, transport error, idle deadline, eviction,
/// shutdown) and always removes itself before tearing the transport down.
pub struct WebSocketClient {
    id: ClientId,
    hub: Hub,
    config: ConnectionConfig,
    metrics: Metrics,
    outbound: mpsc::Sender<Message>,
}

impl WebSocketClient {
    pub fn new(
        id: ClientId,
        hub: Hub,
        config: ConnectionConfig,
        metrics: Metrics,
        outbound: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            id,
            hub,
            config,
            metrics,
            outbound,
        }
    }

    /// Drive the connection until it ends, then tear it down.
    ///
    /// `outbound_rx` is the receive half of the queue registered with the
    /// hub at admission. Teardown order matters: remove from the hub first,
    /// then release our own queue sender so the send loop can flush and
    /// close the transport.
    pub async fn handle(
        self,
        socket: WebSocket,
        outbound_rx: mpsc::Receiver<Message>,
        mut shutdown_guard: ShutdownGuard,
    ) -> HubResult<()> {
        info!("WebSocket connection established: {}", self.id);

        let (ws_sender, mut ws_receiver) = socket.split();

        let send_task = tokio::spawn(run_send_loop(
            ws_sender,
            outbound_rx,
            // A weak handle so the send loop can name its own queue to the
            // hub without holding the channel open.
            self.outbound.downgrade(),
            self.hub.clone(),
            self.config.clone(),
            self.metrics.clone(),
            self.id.clone(),
        ));

        let idle_timeout = Duration::from_secs(self.config.heartbeat_timeout_secs);
        let mut live_rx = self.hub.watch();

        let result = loop {
            tokio::select! {
                msg = timeout(idle_timeout, ws_receiver.next()) => match msg {
                    Ok(Some(Ok(frame))) => {
                        if let Err(e) = self.handle_frame(frame) {
                            self.metrics.error_occurred("frame_handling");
                            break Err(e);
                        }
                    }
                    Ok(Some(Err(e))) => {
                        break Err(HubError::connection_closed(format!("transport error: {e}")));
                    }
                    Ok(None) => {
                        info!("Connection {} closed by peer", self.id);
                        break Ok(());
                    }
                    Err(_) => {
                        warn!(
                            "Connection {} idle for {}s, closing",
                            self.id, self.config.heartbeat_timeout_secs
                        );
                        break Err(HubError::HeartbeatTimeout {
                            timeout_secs: self.config.heartbeat_timeout_secs,
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                },
                res = live_rx.wait_for(|set| set.is_closed() || !set.contains(&self.id)) => {
                    if res.is_ok() {
                        info!("Connection {} dropped from live set, closing", self.id);
                    } else {
                        debug!("Hub gone, closing connection {}", self.id);
                    }
                    break Ok(());
                }
                _ = shutdown_guard.wait() => {
                    info!("Shutdown signal received, closing connection {}", self.id);
                    break Ok(());
                }
            }
        };

        let _ = self.hub.remove(&self.id, &self.outbound).await;
        // Releasing our sender closes the outbound queue once the hub entry
        // is gone, which tells the send loop to flush and exit.
        drop(self.outbound);
        let _ = send_task.await;

        let reason = match &result {
            Ok(()) => "normal",
            Err(HubError::HeartbeatTimeout { .. }) => "idle_timeout",
            Err(_) => "error",
        };
        self.metrics.connection_closed(reason);
        info!("WebSocket connection finished: {} ({})", self.id, reason);

        result
    }

    /// Inbound frames count as liveness only; their content is not routed.
    fn handle_frame(&self, msg: Message) -> HubResult<()> {
        self.metrics.frame_received();

        match msg {
            Message::Ping(data) => {
                // A pong that cannot even be queued means the outbound side
                // is wedged; end the connection rather than appear alive.
                self.outbound
                    .try_send(Message::Pong(data))
                    .map_err(|_| HubError::SendBufferFull {
                        location: ErrorLocation::from(Location::caller()),
                    })?;
                Ok(())
            }
            Message::Pong(_) => Ok(()),
            Message::Text(text) => {
                debug!("Ignoring text frame from {} ({} bytes)", self.id, text.len());
                Ok(())
            }
            Message::Binary(data) => {
                debug!("Ignoring binary frame from {} ({} bytes)", self.id, data.len());
                Ok(())
            }
            Message::Close(_) => {
                info!("Close frame received from {}", self.id);
                Ok(())
            }
        }
    }
}

/// Drains the outbound queue into the socket, emitting heartbeat pings in
/// the gaps. Every write carries a deadline so a wedged transport cannot
/// pin the task. Exits once the queue closes, after attempting a final
/// close frame; a write error or deadline drops the connection from the
/// hub so a half-broken transport is not retained.
async fn run_send_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<Message>,
    queue: mpsc::WeakSender<Message>,
    hub: Hub,
    config: ConnectionConfig,
    metrics: Metrics,
    id: ClientId,
) {
    let write_timeout = Duration::from_secs(config.write_timeout_secs);
    let ping_period = Duration::from_secs(config.heartbeat_interval_secs);
    // First tick lands one full period out; a ping at t=0 would be noise.
    let mut heartbeat = interval_at(Instant::now() + ping_period, ping_period);
    let mut broken = false;

    loop {
        let frame = tokio::select! {
            queued = outbound.recv() => match queued {
                Some(frame) => frame,
                None => {
                    let _ = timeout(write_timeout, sink.send(Message::Close(None))).await;
                    break;
                }
            },
            _ = heartbeat.tick() => Message::Ping(Bytes::new()),
        };

        match timeout(write_timeout, sink.send(frame)).await {
            Ok(Ok(())) => metrics.frame_sent(),
            Ok(Err(e)) => {
                debug!("Send loop for {id} ending: {e}");
                broken = true;
                break;
            }
            Err(_) => {
                warn!(
                    "Write to {id} exceeded {}s deadline, closing",
                    config.write_timeout_secs
                );
                metrics.error_occurred("write_timeout");
                broken = true;
                break;
            }
        }
    }

    // The upgrade fails only if every sender is gone, meaning the receive
    // loop has already torn the entry down.
    if broken && let Some(queue) = queue.upgrade() {
        let _ = hub.remove(&id, &queue).await;
    }
}
