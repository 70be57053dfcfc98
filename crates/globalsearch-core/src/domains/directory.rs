//! Site directory backed by the MediaWiki `sitematrix` API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::debug;

use super::table::{DomainLookupTable, parse_sitematrix};
use crate::config::SitesConfig;
use crate::error::{Error, Result};

/// Source of the complete site-id to hostname listing
#[async_trait]
pub trait SiteDirectory: Send + Sync {
    async fn fetch(&self) -> Result<DomainLookupTable>;
}

/// HTTP client for the `sitematrix` API
#[derive(Debug, Clone)]
pub struct SiteMatrixClient {
    http_client: HttpClient,
    api_url: String,
}

impl SiteMatrixClient {
    pub fn new(api_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            http_client,
            api_url: api_url.into(),
        })
    }

    pub fn from_config(config: &SitesConfig) -> Result<Self> {
        Self::new(config.directory_url.clone(), config.timeout_secs)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl SiteDirectory for SiteMatrixClient {
    async fn fetch(&self) -> Result<DomainLookupTable> {
        debug!(url = %self.api_url, "Fetching site matrix");

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("action", "sitematrix"),
                ("format", "json"),
                ("formatversion", "2"),
                ("smlangprop", "site"),
                ("smsiteprop", "url|dbname"),
            ])
            .send()
            .await
            .map_err(|e| Error::LoadFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::LoadFailure(format!(
                "site directory returned {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::LoadFailure(format!("undecodable site matrix: {}", e)))?;

        parse_sitematrix(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{http_response, serve_once};

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn SiteDirectory) {}

    #[test]
    fn test_from_config() {
        let config = crate::config::Config::default().sites;
        let client = SiteMatrixClient::from_config(&config).unwrap();
        assert_eq!(client.api_url(), "https://meta.wikimedia.org/w/api.php");
    }

    #[tokio::test]
    async fn test_error_status_is_load_failure() {
        let base = serve_once(http_response("502 Bad Gateway", "text/plain", "down")).await;
        let client = SiteMatrixClient::new(format!("{}/w/api.php", base), 5).unwrap();

        let err = client.fetch().await.unwrap_err();
        assert_eq!(err.code(), "E102");
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_site_matrix_is_fetched_and_parsed() {
        let body = r#"{"sitematrix": {"count": 1, "specials": [{"url": "https://meta.wikimedia.org", "dbname": "metawiki"}]}}"#;
        let base = serve_once(http_response("200 OK", "application/json", body)).await;
        let client = SiteMatrixClient::new(format!("{}/w/api.php", base), 5).unwrap();

        let table = client.fetch().await.unwrap();
        assert_eq!(table.resolve("metawiki"), "meta.wikimedia.org");
    }

    #[tokio::test]
    async fn test_unreachable_directory_is_load_failure() {
        let client = SiteMatrixClient::new("http://127.0.0.1:1/w/api.php", 5).unwrap();
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, Error::LoadFailure(_)));
    }
}
