// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The feed store: a pure state machine that reconciles paged fetches and
//! pushed events into one ordered, deduplicated view.
//!
//! The store never performs I/O. Fetches are issued as [`FetchTag`] tickets
//! and resolved through [`FeedStore::apply_fetch`]; the tag carries the
//! generation it was issued under, so results that arrive after a filter
//! change are discarded instead of overwriting the newer filter's feed.

use std::collections::HashSet;

use tracing::{debug, warn};

use scout_core::{
    ConnectionStatus, DedupKey, FilterState, Opportunity, PageRequest, Period, Product,
    ScoutError,
};

/// Ticket for one in-flight paged fetch.
///
/// Captures the generation and request parameters at issue time. Only the
/// store can mint tags, which keeps all busy-flag bookkeeping inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTag {
    generation: u64,
    pub request: PageRequest,
}

/// Result of resolving a fetch ticket against the store.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Batch merged into the feed.
    Applied { appended: usize, exhausted: bool },
    /// The ticket's filter generation is no longer current; nothing changed.
    Discarded,
    /// The fetch failed; feed and cursor retained, busy cleared.
    Failed(ScoutError),
}

/// Presentation-facing view of the store, published after every mutation.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub items: Vec<Opportunity>,
    pub filter: FilterState,
    pub busy: bool,
    pub exhausted: bool,
    pub connection: ConnectionStatus,
    pub total: usize,
}

/// Reconciliation core. Exclusively owns the feed, the page cursor, and the
/// filter state for the lifetime of the current filter combination.
pub struct FeedStore {
    filter: FilterState,
    page_limit: usize,
    items: Vec<Opportunity>,
    seen: HashSet<DedupKey>,
    cursor: usize,
    busy: bool,
    exhausted: bool,
    generation: u64,
    connection: ConnectionStatus,
}

impl FeedStore {
    pub fn new(filter: FilterState, page_limit: usize) -> Self {
        Self {
            filter,
            page_limit,
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: 0,
            busy: false,
            exhausted: false,
            generation: 0,
            connection: ConnectionStatus::Connecting,
        }
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    /// Replaces the filter, clears the feed, resets the cursor, and issues
    /// the page-0 ticket. Bumping the generation invalidates every fetch
    /// still in flight for the previous filter.
    pub fn set_filter(&mut self, product: Product, period: Period) -> FetchTag {
        self.filter = FilterState::new(product, period);
        debug!(filter = %self.filter, "filter changed, feed reset");
        self.begin_generation()
    }

    /// Clears the feed and cursor without changing the filter (manual
    /// refresh). In-flight fetches are invalidated the same way as for a
    /// filter change.
    pub fn reset(&mut self) -> FetchTag {
        debug!(filter = %self.filter, "feed reset");
        self.begin_generation()
    }

    /// Issues a ticket for the next page, or `None` when a fetch is already
    /// outstanding or the source is exhausted for this filter.
    pub fn load_more(&mut self) -> Option<FetchTag> {
        if self.busy || self.exhausted {
            return None;
        }
        self.busy = true;
        Some(self.tag_at(self.cursor))
    }

    /// Resolves a fetch ticket.
    ///
    /// Stale tickets (issued under an older generation) are discarded
    /// without touching any state, including the busy flag, which belongs
    /// to the newer in-flight fetch.
    pub fn apply_fetch(
        &mut self,
        tag: FetchTag,
        result: Result<Vec<Opportunity>, ScoutError>,
    ) -> FetchOutcome {
        if tag.generation != self.generation {
            debug!(request = %tag.request, "stale fetch discarded");
            return FetchOutcome::Discarded;
        }

        self.busy = false;

        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                warn!(request = %tag.request, error = %e, "fetch failed, feed retained");
                return FetchOutcome::Failed(e);
            }
        };

        let received = batch.len();
        let mut appended = 0;
        for record in batch {
            if self.seen.insert(record.dedup_key()) {
                self.items.push(record);
                appended += 1;
            }
        }

        // The cursor is a server-side offset: advance by what the server
        // sent, not by what survived dedup.
        self.cursor += received;
        self.exhausted = received < tag.request.limit;

        debug!(
            request = %tag.request,
            received,
            appended,
            exhausted = self.exhausted,
            "page applied"
        );
        FetchOutcome::Applied {
            appended,
            exhausted: self.exhausted,
        }
    }

    /// Applies a pushed event: prepended immediately when its topic loosely
    /// matches the active product, regardless of in-flight fetch state.
    /// Pushed items are treated as always current, so the period filter
    /// does not apply. Returns whether the event was accepted.
    pub fn receive_push(&mut self, event: Opportunity) -> bool {
        if self.connection != ConnectionStatus::Connected {
            debug!(status = %self.connection, "push dropped, channel not connected");
            return false;
        }
        let Some(topic) = event.topic.as_deref() else {
            return false;
        };
        if !self.filter.accepts_topic(topic) {
            debug!(topic, filter = %self.filter, "push dropped, topic does not match");
            return false;
        }
        if !self.seen.insert(event.dedup_key()) {
            debug!(topic, "push dropped, duplicate record");
            return false;
        }
        self.items.insert(0, event);
        true
    }

    pub fn set_connection(&mut self, status: ConnectionStatus) {
        self.connection = status;
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: self.items.clone(),
            filter: self.filter,
            busy: self.busy,
            exhausted: self.exhausted,
            connection: self.connection,
            total: self.items.len(),
        }
    }

    fn begin_generation(&mut self) -> FetchTag {
        self.items.clear();
        self.seen.clear();
        self.cursor = 0;
        self.exhausted = false;
        self.generation += 1;
        self.busy = true;
        self.tag_at(0)
    }

    fn tag_at(&self, offset: usize) -> FetchTag {
        FetchTag {
            generation: self.generation,
            request: PageRequest {
                product: self.filter.product,
                period: self.filter.period,
                offset,
                limit: self.page_limit,
            },
        }
    }
}
