//! HTTP client for the OpenF1 timing service.
//!
//! Responses are memoized per client instance, keyed by the exact endpoint
//! and query pair, so a multi-endpoint analysis never issues the same
//! request twice. There is no invalidation; clients are short-lived, one per
//! analysis session.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

use pitwall_core::record::Session;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default OpenF1 API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1";

/// Errors from the timing-source transport.
///
/// Every request-level variant names the endpoint that failed, so callers
/// can say which of the fetches broke an analysis.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The base URL was unusable.
    #[error("invalid base URL: {reason}")]
    InvalidBaseUrl { reason: &'static str },

    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request did not complete; timeouts land here.
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    /// The response body was not the expected shape.
    #[error("invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

type CacheKey = (&'static str, Vec<(&'static str, String)>);

/// OpenF1 API client with per-instance response memoization.
///
/// # Thread Safety
///
/// Safe to share across tasks; concurrent fetches to different endpoints
/// only contend on a short-lived cache lock.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    cache: Mutex<HashMap<CacheKey, serde_json::Value>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .cache
            .lock()
            .map_or(0, |cache| cache.len());
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("cached_responses", &entries)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or not http(s), or if the
    /// HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(FetchError::InvalidBaseUrl {
                reason: "base URL cannot be empty",
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(FetchError::InvalidBaseUrl {
                reason: "base URL must be http or https",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Sessions for a championship year.
    pub async fn sessions(&self, year: u16) -> Result<Vec<Session>, FetchError> {
        self.fetch("sessions", vec![("year", year.to_string())])
            .await
    }

    /// Fetch and decode one endpoint, memoizing the raw response.
    ///
    /// The raw JSON array is what gets cached; decoding happens per call so
    /// one cache entry serves whatever record type the caller wants.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: Vec<(&'static str, String)>,
    ) -> Result<Vec<T>, FetchError> {
        let raw = if let Some(raw) = self.cached(endpoint, &query) {
            tracing::debug!(endpoint, "cache hit");
            raw
        } else {
            let raw = self.request(endpoint, &query).await?;
            self.store(endpoint, query, raw.clone());
            raw
        };

        serde_json::from_value(raw).map_err(|source| FetchError::Decode { endpoint, source })
    }

    async fn request(
        &self,
        endpoint: &'static str,
        query: &[(&'static str, String)],
    ) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Request { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { endpoint, status });
        }

        let raw = response
            .json::<serde_json::Value>()
            .await
            .map_err(|source| FetchError::Request { endpoint, source })?;
        tracing::debug!(endpoint, "fetched");
        Ok(raw)
    }

    fn cached(
        &self,
        endpoint: &'static str,
        query: &[(&'static str, String)],
    ) -> Option<serde_json::Value> {
        let cache = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache.get(&(endpoint, query.to_vec())).cloned()
    }

    fn store(
        &self,
        endpoint: &'static str,
        query: Vec<(&'static str, String)>,
        raw: serde_json::Value,
    ) {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache.insert((endpoint, query), raw);
    }
}
