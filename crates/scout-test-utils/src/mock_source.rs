// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock opportunity source for deterministic testing.
//!
//! `MockSource` implements `OpportunitySource` with stubbed pages keyed by
//! (product, offset), a request log for assertions, and an optional gate
//! that holds every in-flight fetch until released — which is how tests
//! reproduce the rapid-filter-change race deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use scout_core::{Opportunity, OpportunitySource, PageRequest, Period, Product, ScoutError};

enum Stub {
    Batch(Vec<Opportunity>),
    Fail,
}

/// A scripted paged source for tests.
///
/// Unstubbed pages resolve to an empty batch (which the store reads as
/// exhaustion).
#[derive(Default)]
pub struct MockSource {
    stubs: Mutex<HashMap<(Product, usize), Stub>>,
    requests: Mutex<Vec<PageRequest>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stubs the batch returned for a (product, offset) page.
    pub fn stub_page(&self, product: Product, offset: usize, batch: Vec<Opportunity>) {
        self.stubs
            .lock()
            .unwrap()
            .insert((product, offset), Stub::Batch(batch));
    }

    /// Makes the (product, offset) page fail with a fetch error.
    pub fn stub_failure(&self, product: Product, offset: usize) {
        self.stubs
            .lock()
            .unwrap()
            .insert((product, offset), Stub::Fail);
    }

    /// Holds every subsequent fetch until the returned notify is
    /// triggered with `notify_waiters()`.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Removes the gate so later fetches resolve immediately.
    pub fn release(&self) {
        *self.gate.lock().unwrap() = None;
    }

    /// All requests the source has seen, in arrival order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl OpportunitySource for MockSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Opportunity>, ScoutError> {
        self.requests.lock().unwrap().push(*request);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self
            .stubs
            .lock()
            .unwrap()
            .get(&(request.product, request.offset))
        {
            Some(Stub::Batch(batch)) => Ok(batch.clone()),
            Some(Stub::Fail) => Err(ScoutError::Fetch {
                request: *request,
                message: "stubbed failure".into(),
                source: None,
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Builds a fetched-style opportunity record with the given title.
pub fn record(title: &str) -> Opportunity {
    serde_json::from_value(serde_json::json!({ "title": title })).unwrap()
}

/// Builds a pushed-style event carrying a topic.
pub fn event(title: &str, topic: &str) -> Opportunity {
    serde_json::from_value(serde_json::json!({ "title": title, "topic": topic })).unwrap()
}

/// Builds a batch of `n` records titled `{prefix}0..{prefix}n`.
pub fn batch(prefix: &str, n: usize) -> Vec<Opportunity> {
    (0..n).map(|i| record(&format!("{prefix}{i}"))).collect()
}

/// Convenience for the default test filter's page request.
pub fn page(product: Product, offset: usize) -> PageRequest {
    PageRequest {
        product,
        period: Period::All,
        offset,
        limit: 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unstubbed_page_is_empty() {
        let source = MockSource::new();
        let got = source.fetch_page(&page(Product::Pfas, 0)).await.unwrap();
        assert!(got.is_empty());
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn stubbed_pages_and_failures_resolve() {
        let source = MockSource::new();
        source.stub_page(Product::Mining, 0, batch("m", 3));
        source.stub_failure(Product::Pfas, 0);

        let ok = source.fetch_page(&page(Product::Mining, 0)).await.unwrap();
        assert_eq!(ok.len(), 3);
        assert!(source.fetch_page(&page(Product::Pfas, 0)).await.is_err());
    }

    #[tokio::test]
    async fn gate_holds_fetches_until_released() {
        let source = Arc::new(MockSource::new());
        let gate = source.hold();

        let task = {
            let source = Arc::clone(&source);
            tokio::spawn(async move { source.fetch_page(&page(Product::Pfas, 0)).await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!task.is_finished(), "fetch held by gate");

        gate.notify_waiters();
        task.await.unwrap().unwrap();
    }
}
