//! Retrieval of the raw dataset payload.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cragmap_core::error::{CragError, Result};

/// Retrieves the dataset as text, without interpreting it.
pub trait PayloadFetcher: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<String>> + Send;
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// Fetches the dataset over HTTP(S). One attempt per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cragmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CragError::SourceUnavailable(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PayloadFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<String> {
        tracing::info!(url = %self.url, "Fetching dataset");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CragError::SourceUnavailable(format!("GET {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CragError::SourceUnavailable(format!(
                "GET {} returned HTTP {}",
                self.url, status
            )));
        }

        let body = response.text().await.map_err(|e| {
            CragError::SourceUnavailable(format!("reading body from {} failed: {}", self.url, e))
        })?;
        tracing::debug!(bytes = body.len(), "Dataset fetched");
        Ok(body)
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Fetcher returning a fixed payload or a fixed failure.
///
/// Counts calls so tests can assert whether a cache was bypassed.
#[derive(Debug, Default)]
pub struct MockFetcher {
    payload: Option<String>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A fetcher whose every call fails with `SourceUnavailable`.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl PayloadFetcher for MockFetcher {
    async fn fetch(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.payload
            .clone()
            .ok_or_else(|| CragError::SourceUnavailable("mock fetcher offline".to_string()))
    }
}
