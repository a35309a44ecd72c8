// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paged opportunity source trait.

use async_trait::async_trait;

use crate::error::ScoutError;
use crate::types::{Opportunity, PageRequest};

/// Adapter for the paged opportunity query boundary.
///
/// Implementations perform one paged query and return the batch in server
/// order. A batch shorter than `request.limit` (including empty) signals
/// that the source is exhausted for this filter combination. Failures must
/// not have side effects beyond the network call itself.
#[async_trait]
pub trait OpportunitySource: Send + Sync {
    /// Fetches one page of opportunity records.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Opportunity>, ScoutError>;
}
