//! CirrusSearch HTTP client
//!
//! Sends one `_search` request per call against a multi-index path.
//! Failures are surfaced as-is; a slow regex scan that fails would only
//! add load if it were retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::query::SearchRequestBody;

use super::types::{RawSearchResponse, SearchResponse};

/// Executes search request bodies against a search engine
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn execute(&self, body: &SearchRequestBody) -> Result<SearchResponse>;
}

/// HTTP client for a CirrusSearch cluster
#[derive(Clone)]
pub struct SearchClient {
    http_client: HttpClient,
    endpoint: String,
    indices: Vec<String>,
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("endpoint", &self.endpoint)
            .field("indices", &self.indices)
            .finish()
    }
}

/// Builder for creating a SearchClient
pub struct SearchClientBuilder {
    endpoint: Option<String>,
    indices: Option<Vec<String>>,
    timeout_secs: Option<u64>,
    insecure: bool,
}

impl Default for SearchClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            endpoint: None,
            indices: None,
            timeout_secs: None,
            insecure: false,
        }
    }

    /// Base URL of the cluster, e.g. `https://cloudelastic.example.org:8243`
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Index patterns to search
    pub fn indices(mut self, indices: Vec<String>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Accept invalid TLS certificates
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Build the SearchClient
    pub fn build(self) -> Result<SearchClient> {
        let defaults = crate::config::Config::default().search;

        let endpoint = self
            .endpoint
            .ok_or_else(|| Error::ConfigError("search endpoint is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let indices = self.indices.unwrap_or(defaults.indices);
        if indices.is_empty() {
            return Err(Error::ConfigError(
                "at least one index pattern is required".to_string(),
            ));
        }

        if self.insecure {
            warn!(endpoint = %endpoint, "TLS certificate verification disabled");
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(
                self.timeout_secs.unwrap_or(defaults.timeout_secs),
            ))
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .map_err(Error::Transport)?;

        Ok(SearchClient {
            http_client,
            endpoint,
            indices,
        })
    }
}

impl SearchClient {
    /// Create a client from the `[search]` configuration section
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        SearchClientBuilder::new()
            .endpoint(config.resolved_endpoint())
            .indices(config.indices.clone())
            .timeout_secs(config.timeout_secs)
            .insecure(config.resolved_insecure())
            .build()
    }

    /// Create a new builder for SearchClient
    pub fn builder() -> SearchClientBuilder {
        SearchClientBuilder::new()
    }

    /// Full `_search` URL over every configured index pattern
    pub fn search_url(&self) -> String {
        format!("{}/{}/_search", self.endpoint, self.indices.join(","))
    }

    async fn send_request(&self, body: &SearchRequestBody) -> Result<SearchResponse> {
        let url = self.search_url();

        debug!(
            url = %url,
            size = body.size,
            filters = body.filters().len(),
            "Sending search request"
        );

        let response = self
            .http_client
            .get(&url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            let detail = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %detail, "Search engine error body");
            return Err(Error::Upstream {
                status: status.as_u16(),
                reason,
            });
        }

        let text = response.text().await.map_err(Error::Transport)?;
        let raw: RawSearchResponse =
            serde_json::from_str(&text).map_err(|e| Error::malformed(status.as_u16(), e))?;

        let parsed = SearchResponse::from(raw);
        info!(total = parsed.total, returned = parsed.hits.len(), "Search completed");
        Ok(parsed)
    }
}

#[async_trait]
impl SearchBackend for SearchClient {
    async fn execute(&self, body: &SearchRequestBody) -> Result<SearchResponse> {
        self.send_request(body).await
    }
}
