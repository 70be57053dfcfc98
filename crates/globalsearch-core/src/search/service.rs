//! Long-lived search service

use std::sync::Arc;

use tracing::info;

use super::pipeline::SearchPipeline;
use super::types::{ResultSet, SearchParams};
use crate::cache::{self, CacheStore, ResultCache, fingerprint};
use crate::config::Config;
use crate::domains::{DomainLookupCache, SiteDirectory, SiteMatrixClient};
use crate::elastic::{SearchBackend, SearchClient};
use crate::error::Result;

/// Entry point for front ends
///
/// Owns the search backend and both caches. Each call to `search` runs a
/// fresh `SearchPipeline` unless the result cache already holds the answer.
#[derive(Clone)]
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    domains: DomainLookupCache,
    results: ResultCache,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("domains", &self.domains)
            .field("results", &self.results)
            .finish()
    }
}

impl SearchService {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        domains: DomainLookupCache,
        results: ResultCache,
    ) -> Self {
        Self {
            backend,
            domains,
            results,
        }
    }

    /// Wire up the HTTP clients and caches over an existing store
    pub fn with_store(
        config: &Config,
        backend: Arc<dyn SearchBackend>,
        directory: Arc<dyn SiteDirectory>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        let domains = DomainLookupCache::new(directory, store.clone(), config.cache.domains_ttl());
        let results = ResultCache::new(store, config.cache.results_ttl());
        Self::new(backend, domains, results)
    }

    /// Build the production service from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = Arc::new(SearchClient::from_config(&config.search)?);
        let directory = Arc::new(SiteMatrixClient::from_config(&config.sites)?);
        let store = cache::open_store(config)?;
        Ok(Self::with_store(config, backend, directory, store))
    }

    /// Run a search, serving from the result cache when possible
    ///
    /// Input is validated before any network call or cache access.
    pub async fn search(&self, params: SearchParams) -> Result<ResultSet> {
        let query = params.to_query()?;
        let key = fingerprint(&query);

        let backend = self.backend.as_ref();
        let domains = &self.domains;
        let query_ref = &query;
        let (set, from_cache) = self
            .results
            .get_or_compute(&key, params.purge, move || async move {
                SearchPipeline::new(backend, domains).run(query_ref).await
            })
            .await?;

        info!(
            total = set.total,
            hits = set.hits.len(),
            from_cache,
            "Search complete"
        );
        Ok(set)
    }
}
