// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `scout serve` command implementation.
//!
//! Wires the fetch client, the websocket push listener, and the feed
//! engine together, then logs feed snapshot transitions until a shutdown
//! signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use scout_config::ScoutConfig;
use scout_core::{FilterState, Period, Product, ScoutError};
use scout_feed::{FeedEngine, FeedStore};
use scout_fetch::FetchClient;
use scout_push::{PushHandle, PushListener, ReconnectPolicy};

use crate::shutdown;

/// Runs the `scout serve` command.
///
/// Starts the push listener and the feed engine with the configured
/// defaults, then follows the snapshot stream. Supports graceful shutdown
/// via signal handlers.
pub async fn run_serve(config: ScoutConfig) -> Result<(), ScoutError> {
    init_tracing(&config.log.level);

    info!("starting scout serve");

    // Validation guarantees these parse; surface a config error otherwise.
    let product: Product = config
        .feed
        .default_product
        .parse()
        .map_err(|_| ScoutError::Config(format!(
            "unknown product `{}`",
            config.feed.default_product
        )))?;
    let period: Period = config
        .feed
        .default_period
        .parse()
        .map_err(|_| ScoutError::Config(format!(
            "unknown period `{}`",
            config.feed.default_period
        )))?;
    let filter = FilterState::new(product, period);

    let source = Arc::new(FetchClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.request_timeout_secs),
    )?);
    info!(base_url = config.api.base_url.as_str(), "fetch client ready");

    let cancel = shutdown::install_signal_handler();

    let channel_url = config.channel.resolved_url(&config.api.base_url);
    let policy = ReconnectPolicy {
        enabled: config.channel.reconnect.enabled,
        initial_backoff: Duration::from_secs(config.channel.reconnect.initial_backoff_secs),
        max_backoff: Duration::from_secs(config.channel.reconnect.max_backoff_secs),
    };
    let PushHandle {
        events,
        status,
        control,
        task: push_task,
    } = PushListener::new(
        &channel_url,
        Duration::from_secs(config.channel.connect_timeout_secs),
        policy,
    )
    .spawn(cancel.clone());
    info!(url = channel_url.as_str(), "push listener started");

    let store = FeedStore::new(filter, config.feed.page_limit);
    let (engine, handle) = FeedEngine::new(store, source, events, status, control);
    let engine_task = tokio::spawn(engine.run(cancel.clone()));
    info!(
        filter = %filter,
        page_limit = config.feed.page_limit,
        "feed engine started"
    );

    // Follow the snapshot stream until shutdown.
    let mut snapshots = handle.snapshots.clone();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                info!(
                    items = snapshot.total,
                    busy = snapshot.busy,
                    exhausted = snapshot.exhausted,
                    connection = %snapshot.connection,
                    "feed updated"
                );
            }
        }
    }

    let _ = engine_task.await;
    let _ = push_task.await;

    info!("scout serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scout={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
