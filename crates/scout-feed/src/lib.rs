// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feed reconciliation for the Scout engine.
//!
//! Three concurrent update sources — the initial/paged fetch, the
//! infinite-scroll fetch, and asynchronous push events — are merged into
//! one consistent, deduplicated, ordered view:
//!
//! - [`FeedStore`] is the pure state machine (feed, cursor, filter, busy
//!   flag, connection status) with the filter-tag-and-discard rule for
//!   stale fetches.
//! - [`FeedEngine`] is the async driver that serializes all mutations
//!   through the store and publishes [`FeedSnapshot`]s.
//! - [`ScrollTrigger`] debounces the boundary-crossing signal that gates
//!   `load_more`.

pub mod engine;
pub mod store;
pub mod trigger;

pub use engine::{FeedCommand, FeedEngine, FeedHandle};
pub use store::{FeedSnapshot, FeedStore, FetchOutcome, FetchTag};
pub use trigger::ScrollTrigger;
