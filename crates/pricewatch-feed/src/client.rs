//! HTTP client for the BrsApi gold/currency endpoint.

use crate::config::FeedConfig;
use crate::error::{FetchError, FetchResult};
use crate::fetcher::{BoxFuture, SnapshotFetcher};
use crate::parser::parse_snapshot;
use pricewatch_core::{CivilClock, Snapshot, Symbol};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Error bodies longer than this are cut before they reach logs.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Client for fetching quote snapshots.
pub struct BrsApiClient {
    /// HTTP client.
    client: Client,
    /// Endpoint URL.
    base_url: String,
    api_key: String,
    symbols: Vec<Symbol>,
    timeout: Duration,
    /// Stamps snapshots whose feed omits an update time.
    clock: CivilClock,
}

impl BrsApiClient {
    /// Create a new client from configuration.
    pub fn new(config: &FeedConfig, clock: CivilClock) -> FetchResult<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {e}")))?;

        info!(
            url = %config.base_url,
            symbols = config.symbols.len(),
            timeout_secs = config.request_timeout_secs,
            "Quote client created"
        );

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            symbols: config.symbols.clone(),
            timeout,
            clock,
        })
    }

    /// Fetch and normalize one snapshot.
    pub async fn fetch_snapshot(&self) -> FetchResult<Snapshot> {
        debug!(url = %self.base_url, "Fetching quotes");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(format!("Failed to parse response: {e}")))?;

        let snapshot = parse_snapshot(&body, &self.symbols, &self.clock.now())?;
        debug!(
            available = snapshot.available_count(),
            total = snapshot.len(),
            timestamp = ?snapshot.timestamp,
            "Quotes fetched"
        );
        Ok(snapshot)
    }

    fn map_request_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            // without_url keeps the api key out of logs
            FetchError::Http(format!("HTTP request failed: {}", error.without_url()))
        }
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

impl SnapshotFetcher for BrsApiClient {
    fn fetch(&self) -> BoxFuture<'_, FetchResult<Snapshot>> {
        Box::pin(self.fetch_snapshot())
    }

    fn name(&self) -> &str {
        "brsapi"
    }
}
