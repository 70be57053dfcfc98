//! Per-request search pipeline

use std::sync::Arc;

use tracing::debug;

use super::types::ResultSet;
use crate::domains::{DomainLookupCache, DomainLookupTable};
use crate::elastic::SearchBackend;
use crate::error::Result;
use crate::format;
use crate::query::{self, SearchQuery};

/// Runs one query through build, execute and format
///
/// Constructed per request. The lookup table is fetched only when the
/// first hit needs a domain and is then reused for the rest of the page.
pub struct SearchPipeline<'a> {
    backend: &'a dyn SearchBackend,
    domains: &'a DomainLookupCache,
    lookup: Option<Arc<DomainLookupTable>>,
}

impl<'a> SearchPipeline<'a> {
    pub fn new(backend: &'a dyn SearchBackend, domains: &'a DomainLookupCache) -> Self {
        Self {
            backend,
            domains,
            lookup: None,
        }
    }

    async fn lookup(&mut self) -> Result<Arc<DomainLookupTable>> {
        if let Some(table) = &self.lookup {
            return Ok(Arc::clone(table));
        }
        let table = self.domains.table().await?;
        self.lookup = Some(Arc::clone(&table));
        Ok(table)
    }

    pub async fn run(mut self, query: &SearchQuery) -> Result<ResultSet> {
        let body = query::build(query);
        debug!(regex = query.is_regex(), size = body.size, "Executing search");

        let response = self.backend.execute(&body).await?;

        let hits = if response.hits.is_empty() {
            Vec::new()
        } else {
            let lookup = self.lookup().await?;
            format::format(&response, &lookup)
        };

        Ok(ResultSet::new(query, response.total, hits))
    }
}
