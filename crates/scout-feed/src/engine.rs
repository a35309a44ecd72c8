// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async driver that serializes every feed mutation through the store.
//!
//! The engine task is the single owner of the [`FeedStore`]. Presentation
//! commands, decoded push events, connection-status transitions, and
//! resolved fetches all flow into one `select!` loop, so a push-prepend can
//! never tear a page-append. Fetches run as spawned tasks that report back
//! over an internal channel, tagged with the ticket they were issued for.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use scout_core::{
    ConnectionStatus, Opportunity, OpportunitySource, Period, Product, PushCommand, ScoutError,
};

use crate::store::{FeedSnapshot, FeedStore, FetchOutcome, FetchTag};
use crate::trigger::ScrollTrigger;

/// Inputs accepted from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    SetFilter { product: Product, period: Period },
    LoadMore,
    Reset,
    /// Raw viewport observation from the injected boundary source.
    Boundary { in_view: bool },
}

/// Presentation-facing handle: command input and the live snapshot output.
#[derive(Clone)]
pub struct FeedHandle {
    pub commands: mpsc::Sender<FeedCommand>,
    pub snapshots: watch::Receiver<FeedSnapshot>,
}

/// The feed synchronization engine.
pub struct FeedEngine {
    store: FeedStore,
    trigger: ScrollTrigger,
    source: Arc<dyn OpportunitySource>,
    commands: mpsc::Receiver<FeedCommand>,
    events: mpsc::Receiver<Opportunity>,
    status: watch::Receiver<ConnectionStatus>,
    push_control: mpsc::Sender<PushCommand>,
    resolved_tx: mpsc::Sender<(FetchTag, Result<Vec<Opportunity>, ScoutError>)>,
    resolved_rx: mpsc::Receiver<(FetchTag, Result<Vec<Opportunity>, ScoutError>)>,
    snapshots: watch::Sender<FeedSnapshot>,
}

impl FeedEngine {
    /// Builds an engine around a store and the push listener's channels,
    /// returning the handle presentation drives it with.
    pub fn new(
        store: FeedStore,
        source: Arc<dyn OpportunitySource>,
        events: mpsc::Receiver<Opportunity>,
        status: watch::Receiver<ConnectionStatus>,
        push_control: mpsc::Sender<PushCommand>,
    ) -> (Self, FeedHandle) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (resolved_tx, resolved_rx) = mpsc::channel(64);
        let (snapshot_tx, snapshot_rx) = watch::channel(store.snapshot());

        let engine = Self {
            store,
            trigger: ScrollTrigger::new(),
            source,
            commands: command_rx,
            events,
            status,
            push_control,
            resolved_tx,
            resolved_rx,
            snapshots: snapshot_tx,
        };
        let handle = FeedHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (engine, handle)
    }

    /// Runs the engine until the cancellation token fires.
    ///
    /// Issues the page-0 fetch for the store's initial filter immediately,
    /// then reconciles all inputs in arrival order.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(filter = %self.store.filter(), "feed engine running");

        let initial = self.store.reset();
        self.spawn_fetch(initial);
        self.publish();

        loop {
            tokio::select! {
                Some(command) = self.commands.recv() => {
                    self.handle_command(command).await;
                }
                Some(event) = self.events.recv() => {
                    if self.store.receive_push(event) {
                        info!(filter = %self.store.filter(), "live update accepted");
                        self.publish();
                    }
                }
                Ok(()) = self.status.changed() => {
                    let status = *self.status.borrow_and_update();
                    info!(status = %status, "connection status changed");
                    self.store.set_connection(status);
                    self.publish();
                }
                Some((tag, result)) = self.resolved_rx.recv() => {
                    match self.store.apply_fetch(tag, result) {
                        FetchOutcome::Applied { appended, exhausted } => {
                            debug!(appended, exhausted, "fetch applied");
                        }
                        FetchOutcome::Discarded => {}
                        FetchOutcome::Failed(e) => {
                            error!(error = %e, "fetch failed");
                        }
                    }
                    self.publish();
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping feed engine");
                    break;
                }
                else => break,
            }
        }
    }

    async fn handle_command(&mut self, command: FeedCommand) {
        match command {
            FeedCommand::SetFilter { product, period } => {
                let tag = self.store.set_filter(product, period);
                self.spawn_fetch(tag);
                // The listener is rebound per active filter: explicit
                // close-then-open owned by the engine.
                if self.push_control.send(PushCommand::Rebind).await.is_err() {
                    warn!("push listener control channel closed");
                }
                self.publish();
            }
            FeedCommand::LoadMore => {
                if let Some(tag) = self.store.load_more() {
                    self.spawn_fetch(tag);
                    self.publish();
                }
            }
            FeedCommand::Reset => {
                let tag = self.store.reset();
                self.spawn_fetch(tag);
                self.publish();
            }
            FeedCommand::Boundary { in_view } => {
                if self
                    .trigger
                    .observe(in_view, self.store.busy(), self.store.exhausted())
                    && let Some(tag) = self.store.load_more()
                {
                    debug!(offset = tag.request.offset, "boundary crossed, loading next page");
                    self.spawn_fetch(tag);
                    self.publish();
                }
            }
        }
    }

    fn spawn_fetch(&self, tag: FetchTag) {
        let source = Arc::clone(&self.source);
        let resolved = self.resolved_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_page(&tag.request).await;
            // Engine gone means shutdown; nothing to deliver to.
            let _ = resolved.send((tag, result)).await;
        });
    }

    fn publish(&self) {
        let _ = self.snapshots.send(self.store.snapshot());
    }
}
