// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-lived websocket listener for live opportunity updates.
//!
//! The listener runs as a background task that decodes inbound JSON frames
//! into [`Opportunity`] events and forwards them over an mpsc channel.
//! Connection-state transitions are published over a watch channel:
//! `connecting` on every attempt, `connected` on open, `disconnected` on
//! close or error. Malformed frames (and frames without a `topic`) are
//! dropped without terminating the connection.
//!
//! Lifecycle is explicit: the engine sends [`PushCommand::Rebind`] to
//! close and reopen the connection on filter change, and cancelling the
//! token closes the socket deterministically — no events are delivered
//! after close. Unexpected closes follow the configured reconnect policy.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scout_core::{ConnectionStatus, Opportunity, PushCommand};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Policy applied after an unexpected connection drop.
///
/// The reference behavior never reconnects; that is expressible as
/// `enabled = false`, in which case the listener stays disconnected until
/// the next rebind request.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// Handle to a spawned listener task.
pub struct PushHandle {
    /// Decoded events, in arrival order.
    pub events: mpsc::Receiver<Opportunity>,
    /// Connection-state transitions.
    pub status: watch::Receiver<ConnectionStatus>,
    /// Control input (rebind).
    pub control: mpsc::Sender<PushCommand>,
    /// The listener task itself.
    pub task: JoinHandle<()>,
}

impl PushHandle {
    /// Waits for the listener task to finish after cancellation.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Websocket push listener.
pub struct PushListener {
    url: String,
    connect_timeout: Duration,
    reconnect: ReconnectPolicy,
}

impl PushListener {
    pub fn new(
        url: impl Into<String>,
        connect_timeout: Duration,
        reconnect: ReconnectPolicy,
    ) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
            reconnect,
        }
    }

    /// Spawns the listener task and returns its handle.
    pub fn spawn(self, cancel: CancellationToken) -> PushHandle {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let (control_tx, control_rx) = mpsc::channel(8);

        let task = tokio::spawn(run_listener(self, cancel, event_tx, status_tx, control_rx));

        PushHandle {
            events: event_rx,
            status: status_rx,
            control: control_tx,
            task,
        }
    }
}

/// Why a connection (attempt) ended.
enum SessionEnd {
    Cancelled,
    Rebind,
    Closed,
}

async fn run_listener(
    listener: PushListener,
    cancel: CancellationToken,
    events: mpsc::Sender<Opportunity>,
    status: watch::Sender<ConnectionStatus>,
    mut control: mpsc::Receiver<PushCommand>,
) {
    let mut backoff = listener.reconnect.initial_backoff;

    loop {
        let _ = status.send(ConnectionStatus::Connecting);
        info!(url = %listener.url, "connecting to update channel");

        let attempt =
            tokio::time::timeout(listener.connect_timeout, connect_async(listener.url.as_str()));
        let connected = tokio::select! {
            _ = cancel.cancelled() => return,
            result = attempt => result,
        };

        match connected {
            Ok(Ok((stream, _response))) => {
                info!("update channel connected");
                let _ = status.send(ConnectionStatus::Connected);
                backoff = listener.reconnect.initial_backoff;

                let end = read_frames(stream, &events, &mut control, &cancel).await;
                let _ = status.send(ConnectionStatus::Disconnected);
                match end {
                    SessionEnd::Cancelled => return,
                    SessionEnd::Rebind => continue,
                    SessionEnd::Closed => {}
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "update channel connect failed");
                let _ = status.send(ConnectionStatus::Disconnected);
            }
            Err(_) => {
                warn!(timeout = ?listener.connect_timeout, "update channel connect timed out");
                let _ = status.send(ConnectionStatus::Disconnected);
            }
        }

        if listener.reconnect.enabled {
            debug!(backoff = ?backoff, "reconnecting after backoff");
            tokio::select! {
                _ = cancel.cancelled() => return,
                command = control.recv() => match command {
                    Some(PushCommand::Rebind) => {
                        backoff = listener.reconnect.initial_backoff;
                    }
                    None => return,
                },
                _ = tokio::time::sleep(backoff) => {
                    backoff = (backoff * 2).min(listener.reconnect.max_backoff);
                }
            }
        } else {
            // Stay disconnected until explicitly rebound.
            tokio::select! {
                _ = cancel.cancelled() => return,
                command = control.recv() => match command {
                    Some(PushCommand::Rebind) => {}
                    None => return,
                },
            }
        }
    }
}

/// Reads frames until the connection ends, forwarding decoded events.
async fn read_frames(
    mut stream: WsStream,
    events: &mpsc::Sender<Opportunity>,
    control: &mut mpsc::Receiver<PushCommand>,
    cancel: &CancellationToken,
) -> SessionEnd {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = stream.close(None).await;
                return SessionEnd::Cancelled;
            }
            command = control.recv() => {
                match command {
                    Some(PushCommand::Rebind) => {
                        debug!("rebind requested, closing connection");
                        let _ = stream.close(None).await;
                        return SessionEnd::Rebind;
                    }
                    None => {
                        let _ = stream.close(None).await;
                        return SessionEnd::Cancelled;
                    }
                }
            }
            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<Opportunity>(text.as_str()) {
                            Ok(event) if event.topic.is_some() => {
                                if events.send(event).await.is_err() {
                                    // Engine gone; shut the connection down.
                                    let _ = stream.close(None).await;
                                    return SessionEnd::Cancelled;
                                }
                            }
                            Ok(_) => debug!("frame without topic dropped"),
                            Err(e) => warn!(error = %e, "malformed frame dropped"),
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = stream.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("update channel closed by peer");
                        return SessionEnd::Closed;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "update channel error");
                        return SessionEnd::Closed;
                    }
                }
            }
        }
    }
}
