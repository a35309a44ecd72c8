// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the feed engine: store, trigger, and fetch tasks
//! wired together against a scripted source and injected push/status
//! channels.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use scout_core::{
    ConnectionStatus, FilterState, Opportunity, Period, Product, PushCommand,
};
use scout_feed::{FeedCommand, FeedEngine, FeedHandle, FeedSnapshot, FeedStore};
use scout_test_utils::{batch, event, MockSource};

struct Harness {
    source: Arc<MockSource>,
    handle: FeedHandle,
    events: mpsc::Sender<Opportunity>,
    status: watch::Sender<ConnectionStatus>,
    rebinds: mpsc::Receiver<PushCommand>,
    _cancel: tokio_util::sync::DropGuard,
}

fn spawn_engine(product: Product) -> Harness {
    let source = Arc::new(MockSource::new());
    let (event_tx, event_rx) = mpsc::channel(16);
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
    let (control_tx, control_rx) = mpsc::channel(8);

    let store = FeedStore::new(FilterState::new(product, Period::All), 8);
    let (engine, handle) = FeedEngine::new(
        store,
        Arc::clone(&source) as Arc<dyn scout_core::OpportunitySource>,
        event_rx,
        status_rx,
        control_tx,
    );

    let cancel = CancellationToken::new();
    tokio::spawn(engine.run(cancel.clone()));

    Harness {
        source,
        handle,
        events: event_tx,
        status: status_tx,
        rebinds: control_rx,
        _cancel: cancel.drop_guard(),
    }
}

/// Waits until the published snapshot satisfies the predicate.
async fn wait_for<F>(handle: &mut FeedHandle, mut pred: F) -> FeedSnapshot
where
    F: FnMut(&FeedSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let snap = handle.snapshots.borrow_and_update();
                if pred(&snap) {
                    return snap.clone();
                }
            }
            handle.snapshots.changed().await.expect("engine stopped");
        }
    })
    .await
    .expect("snapshot predicate never satisfied")
}

fn titles(snap: &FeedSnapshot) -> Vec<String> {
    snap.items.iter().map(|o| o.title.clone()).collect()
}

#[tokio::test]
async fn initial_fetch_populates_feed_and_short_batch_exhausts() {
    let mut h = spawn_engine(Product::Pfas);
    h.source.stub_page(Product::Pfas, 0, batch("p", 5));

    let snap = wait_for(&mut h.handle, |s| !s.busy && s.total == 5).await;
    assert!(snap.exhausted, "5 of limit 8 marks exhaustion");

    // Exhausted: load_more performs no network call.
    h.handle.commands.send(FeedCommand::LoadMore).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.source.request_count(), 1);
}

#[tokio::test]
async fn pushes_prepend_while_connected_only() {
    let mut h = spawn_engine(Product::Pfas);
    h.source.stub_page(Product::Pfas, 0, batch("p", 2));
    wait_for(&mut h.handle, |s| !s.busy && s.total == 2).await;

    // Not yet connected: event dropped.
    h.events.send(event("early", "PFAS")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.handle.snapshots.borrow().total, 2);

    h.status.send(ConnectionStatus::Connected).unwrap();
    wait_for(&mut h.handle, |s| s.connection == ConnectionStatus::Connected).await;

    h.events.send(event("e1", "PFAS")).await.unwrap();
    h.events
        .send(event("e2", "Jacobi Updates - PFAS Division"))
        .await
        .unwrap();
    let snap = wait_for(&mut h.handle, |s| s.total == 4).await;
    assert_eq!(titles(&snap), vec!["e2", "e1", "p0", "p1"]);

    // Non-matching topic is rejected by the loose match.
    h.events.send(event("other", "Mining")).await.unwrap();

    h.status.send(ConnectionStatus::Disconnected).unwrap();
    wait_for(&mut h.handle, |s| {
        s.connection == ConnectionStatus::Disconnected
    })
    .await;
    h.events.send(event("late", "PFAS")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.handle.snapshots.borrow().total, 4, "no effects after disconnect");
}

#[tokio::test]
async fn rapid_filter_change_discards_stale_results() {
    let mut h = spawn_engine(Product::Pfas);
    h.source.stub_page(Product::Pfas, 0, batch("pfas", 8));
    h.source.stub_page(Product::Mining, 0, batch("mining", 3));

    // Hold both fetches in flight, switch filters, then release.
    let gate = h.source.hold();
    h.handle
        .commands
        .send(FeedCommand::SetFilter {
            product: Product::Mining,
            period: Period::All,
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.source.request_count(), 2, "both fetches issued");
    gate.notify_waiters();

    let snap = wait_for(&mut h.handle, |s| !s.busy && s.total > 0).await;
    assert_eq!(snap.filter.product, Product::Mining);
    assert_eq!(snap.total, 3);
    assert!(
        titles(&snap).iter().all(|t| t.starts_with("mining")),
        "no stale PFAS records leaked: {snap:?}"
    );

    // Filter change rebinds the push listener.
    assert_eq!(h.rebinds.recv().await, Some(PushCommand::Rebind));
}

#[tokio::test]
async fn boundary_crossing_loads_next_page_once() {
    let mut h = spawn_engine(Product::Pfas);
    h.source.stub_page(Product::Pfas, 0, batch("a", 8));
    h.source.stub_page(Product::Pfas, 8, batch("b", 3));
    wait_for(&mut h.handle, |s| !s.busy && s.total == 8).await;

    h.handle
        .commands
        .send(FeedCommand::Boundary { in_view: true })
        .await
        .unwrap();
    let snap = wait_for(&mut h.handle, |s| !s.busy && s.total == 11).await;
    assert!(snap.exhausted);
    assert_eq!(titles(&snap)[8], "b0", "page order preserved");

    // Staying in view does not re-fire; re-entry while exhausted is gated.
    h.handle
        .commands
        .send(FeedCommand::Boundary { in_view: true })
        .await
        .unwrap();
    h.handle
        .commands
        .send(FeedCommand::Boundary { in_view: false })
        .await
        .unwrap();
    h.handle
        .commands
        .send(FeedCommand::Boundary { in_view: true })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.source.request_count(), 2);
}

#[tokio::test]
async fn failed_page_retains_feed_and_allows_retry() {
    let mut h = spawn_engine(Product::Pfas);
    h.source.stub_page(Product::Pfas, 0, batch("a", 8));
    h.source.stub_failure(Product::Pfas, 8);
    wait_for(&mut h.handle, |s| !s.busy && s.total == 8).await;

    h.handle.commands.send(FeedCommand::LoadMore).await.unwrap();
    let snap = wait_for(&mut h.handle, |s| !s.busy && h.source.request_count() == 2).await;
    assert_eq!(snap.total, 8, "feed unchanged after failure");
    assert!(!snap.exhausted);

    // Same cursor on retry.
    h.source.stub_page(Product::Pfas, 8, batch("b", 1));
    h.handle.commands.send(FeedCommand::LoadMore).await.unwrap();
    let snap = wait_for(&mut h.handle, |s| s.total == 9).await;
    assert_eq!(titles(&snap)[8], "b0");
}

#[tokio::test]
async fn reset_refetches_page_zero_for_current_filter() {
    let mut h = spawn_engine(Product::Mining);
    h.source.stub_page(Product::Mining, 0, batch("m", 4));
    wait_for(&mut h.handle, |s| !s.busy && s.total == 4).await;

    h.handle.commands.send(FeedCommand::Reset).await.unwrap();
    let snap = wait_for(&mut h.handle, |s| !s.busy && h.source.request_count() == 2).await;
    assert_eq!(snap.filter.product, Product::Mining);
    assert_eq!(snap.total, 4);
    let offsets: Vec<_> = h.source.requests().iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![0, 0]);
}
