// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Scout feed engine.
//!
//! This crate provides the data model (opportunity records, filter state,
//! connection status), the error taxonomy, and the adapter trait for the
//! paged opportunity source. The transport crates (`scout-fetch`,
//! `scout-push`) and the reconciliation core (`scout-feed`) build on it.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ScoutError;
pub use traits::OpportunitySource;
pub use types::{
    ConnectionStatus, DedupKey, FilterState, Opportunity, PageRequest, Period, Product,
    PushCommand,
};
