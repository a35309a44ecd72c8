// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the paged opportunity endpoint.
//!
//! Provides [`FetchClient`] which handles request construction, response
//! decoding (a bare object is treated as a one-element batch), and a
//! single retry on transient errors. The client never touches feed state;
//! failures carry the attempted request so the caller can retry at the
//! same cursor.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use scout_core::{Opportunity, OpportunitySource, PageRequest, ScoutError};

/// Ordering requested from the source; fixed by the wire contract.
const ORDER: &str = "asc";

/// A batch response: the endpoint returns either an array of records or a
/// single record, which is treated as a one-element sequence.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageResponse {
    Many(Vec<Opportunity>),
    One(Opportunity),
}

impl From<PageResponse> for Vec<Opportunity> {
    fn from(response: PageResponse) -> Self {
        match response {
            PageResponse::Many(records) => records,
            PageResponse::One(record) => vec![record],
        }
    }
}

/// HTTP client for the opportunity source.
///
/// Manages connection pooling, the bounded request timeout, and retry
/// logic for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl FetchClient {
    /// Creates a new fetch client against the configured API base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ScoutError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Fetches one page of opportunity records.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second
    /// delay. The query carries `product` (percent-encoded by reqwest),
    /// `period`, `skip`, `limit`, and `order=asc`.
    pub async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<Vec<Opportunity>, ScoutError> {
        let url = format!("{}/opportunities", self.base_url);
        let query = [
            ("product", request.product.to_string()),
            ("period", request.period.to_string()),
            ("skip", request.offset.to_string()),
            ("limit", request.limit.to_string()),
            ("order", ORDER.to_string()),
        ];

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, request = %request, "retrying fetch after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|e| ScoutError::Fetch {
                    request: *request,
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, request = %request, "page response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| ScoutError::Fetch {
                    request: *request,
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let page: PageResponse =
                    serde_json::from_str(&body).map_err(|e| ScoutError::Fetch {
                        request: *request,
                        message: format!("failed to decode response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(page.into());
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(ScoutError::Fetch {
                    request: *request,
                    message: format!("source returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Fetch {
                request: *request,
                message: format!("source returned {status}: {body}"),
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| ScoutError::Fetch {
            request: *request,
            message: "fetch failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl OpportunitySource for FetchClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Opportunity>, ScoutError> {
        FetchClient::fetch_page(self, request).await
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::{Period, Product};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> FetchClient {
        FetchClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn test_request(product: Product, offset: usize) -> PageRequest {
        PageRequest {
            product,
            period: Period::All,
            offset,
            limit: 8,
        }
    }

    #[tokio::test]
    async fn fetch_page_decodes_array() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            {"title": "Carbon demand rises", "source": "Reuters"},
            {"title": "New PFAS rule", "date": "2026-08-01T00:00:00Z"}
        ]);

        Mock::given(method("GET"))
            .and(path("/opportunities"))
            .and(query_param("product", "PFAS"))
            .and(query_param("period", "all"))
            .and(query_param("skip", "0"))
            .and(query_param("limit", "8"))
            .and(query_param("order", "asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let batch = client
            .fetch_page(&test_request(Product::Pfas, 0))
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].title, "Carbon demand rises");
        assert!(batch[1].date.is_some());
    }

    #[tokio::test]
    async fn single_object_is_one_element_batch() {
        let server = MockServer::start().await;
        let body = serde_json::json!({"title": "Lone record"});

        Mock::given(method("GET"))
            .and(path("/opportunities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let batch = client
            .fetch_page(&test_request(Product::Mining, 0))
            .await
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].title, "Lone record");
    }

    #[tokio::test]
    async fn product_names_with_spaces_are_encoded() {
        let server = MockServer::start().await;

        // wiremock matches the decoded query value.
        Mock::given(method("GET"))
            .and(path("/opportunities"))
            .and(query_param("product", "Soil Remediation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let batch = client
            .fetch_page(&test_request(Product::SoilRemediation, 0))
            .await
            .unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn retries_once_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/opportunities"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"title": "after retry"}])),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let batch = client
            .fetch_page(&test_request(Product::Pfas, 8))
            .await
            .unwrap();
        assert_eq!(batch[0].title, "after retry");
    }

    #[tokio::test]
    async fn failure_carries_attempted_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .fetch_page(&test_request(Product::GoldRecovery, 16))
            .await
            .unwrap_err();
        match err {
            ScoutError::Fetch { request, .. } => {
                assert_eq!(request.offset, 16);
                assert_eq!(request.product, Product::GoldRecovery);
            }
            other => panic!("expected fetch error, got {other}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_a_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .fetch_page(&test_request(Product::Pfas, 0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("decode"), "got: {err}");
    }
}
