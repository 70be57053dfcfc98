//! Result set cache keyed by query fingerprint

use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::store::{CacheStore, TtlCache};
use crate::error::Result;
use crate::query::SearchQuery;
use crate::search::ResultSet;

/// Namespace holding result sets
pub const RESULTS_NAMESPACE: &str = "results";

/// Stable cache key for a query
///
/// Every field is length-prefixed and namespaces are comma-joined in
/// ascending order, so distinct parameter tuples cannot produce the same
/// byte stream.
pub fn fingerprint(query: &SearchQuery) -> String {
    let mut hasher = Sha256::new();

    let mut field = |value: &str| {
        hasher.update(value.len().to_string().as_bytes());
        hasher.update(b":");
        hasher.update(value.as_bytes());
        hasher.update(b";");
    };

    field(query.query());
    field(if query.is_regex() { "1" } else { "0" });
    field(if query.ignore_case() { "1" } else { "0" });
    match query.title_pattern() {
        Some(pattern) => field(&format!("some:{}", pattern)),
        None => field("none"),
    }
    let namespaces: Vec<String> = query.namespaces().iter().map(i32::to_string).collect();
    field(&namespaces.join(","));

    hex::encode(hasher.finalize())
}

/// Memoizes complete result sets
#[derive(Debug, Clone)]
pub struct ResultCache {
    cache: TtlCache,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(store, RESULTS_NAMESPACE, ttl),
        }
    }

    /// Return the cached set for `fingerprint`, or compute and store it
    ///
    /// With `purge` the lookup is skipped and the fresh value overwrites
    /// whatever was stored. Failed computations are never stored. The
    /// returned flag says whether the value came from the cache.
    pub async fn get_or_compute<F, Fut>(
        &self,
        fingerprint: &str,
        purge: bool,
        compute: F,
    ) -> Result<(ResultSet, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResultSet>>,
    {
        if !purge {
            if let Some(mut cached) = self.cache.get::<ResultSet>(fingerprint) {
                debug!(fingerprint, "Result cache hit");
                cached.from_cache = true;
                return Ok((cached, true));
            }
        }

        debug!(fingerprint, purge, "Result cache miss");
        let mut fresh = compute().await?;
        fresh.from_cache = false;
        self.cache.put(fingerprint, &fresh);
        Ok((fresh, false))
    }
}
