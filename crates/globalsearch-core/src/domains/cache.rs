//! Long-lived cache in front of the site directory

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::directory::SiteDirectory;
use super::table::DomainLookupTable;
use crate::cache::{CacheStore, TtlCache};
use crate::error::{Error, Result};

/// Namespace holding the lookup table
pub const DOMAINS_NAMESPACE: &str = "domains";

/// The table is a single entry
const LOOKUP_KEY: &str = "wikidomainlookup";

/// Serves the lookup table, rebuilding it wholesale after expiry
///
/// A rebuild happens inline on the request that finds the table missing.
/// Failed loads leave the cache empty so the next request tries again.
#[derive(Clone)]
pub struct DomainLookupCache {
    directory: Arc<dyn SiteDirectory>,
    cache: TtlCache,
}

impl std::fmt::Debug for DomainLookupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainLookupCache")
            .field("cache", &self.cache)
            .finish()
    }
}

impl DomainLookupCache {
    pub fn new(
        directory: Arc<dyn SiteDirectory>,
        store: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            directory,
            cache: TtlCache::new(store, DOMAINS_NAMESPACE, ttl),
        }
    }

    /// Current table, loading it from the directory when absent or stale
    pub async fn table(&self) -> Result<Arc<DomainLookupTable>> {
        if let Some(table) = self.cache.get::<DomainLookupTable>(LOOKUP_KEY) {
            return Ok(Arc::new(table));
        }

        let table = self.directory.fetch().await.inspect_err(|e| {
            warn!(error = %e, "Site directory load failed");
        })?;

        if table.is_empty() {
            return Err(Error::LoadFailure("site directory listed no sites".to_string()));
        }

        info!(sites = table.len(), "Loaded site directory");
        self.cache.put(LOOKUP_KEY, &table);
        Ok(Arc::new(table))
    }

    /// Resolve a single site id; only the table load can fail
    pub async fn resolve(&self, site_id: &str) -> Result<String> {
        Ok(self.table().await?.resolve(site_id).to_string())
    }

    /// Force the next `table` call to reload
    pub fn invalidate(&self) {
        self.cache.evict(LOOKUP_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, MemoryStore};
    use crate::domains::WIKI_NOT_FOUND;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory that fails its first `failures` fetches
    struct FakeDirectory {
        calls: AtomicUsize,
        failures: usize,
    }

    impl FakeDirectory {
        fn new(failures: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SiteDirectory for FakeDirectory {
        async fn fetch(&self) -> Result<DomainLookupTable> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(Error::LoadFailure("directory down".to_string()));
            }
            Ok([("enwiki".to_string(), "en.wikipedia.org".to_string())]
                .into_iter()
                .collect())
        }
    }

    fn cache(directory: Arc<FakeDirectory>, store: Arc<MemoryStore>) -> DomainLookupCache {
        DomainLookupCache::new(directory, store, Duration::from_secs(36_000))
    }

    #[tokio::test]
    async fn test_table_is_loaded_once() {
        let directory = Arc::new(FakeDirectory::new(0));
        let lookup = cache(directory.clone(), Arc::new(MemoryStore::new()));

        assert_eq!(lookup.resolve("enwiki").await.unwrap(), "en.wikipedia.org");
        assert_eq!(lookup.resolve("frwiki").await.unwrap(), WIKI_NOT_FOUND);
        assert_eq!(directory.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let directory = Arc::new(FakeDirectory::new(1));
        let store = Arc::new(MemoryStore::new());
        let lookup = cache(directory.clone(), store.clone());

        let err = lookup.table().await.unwrap_err();
        assert!(matches!(err, Error::LoadFailure(_)));
        assert!(store.is_empty());

        let table = lookup.table().await.unwrap();
        assert_eq!(table.resolve("enwiki"), "en.wikipedia.org");
        assert_eq!(directory.calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_table_is_rebuilt() {
        let directory = Arc::new(FakeDirectory::new(0));
        let store = Arc::new(MemoryStore::new());
        let stale = CacheEntry::created_at(
            serde_json::json!({"oldwiki": "old.example.org"}),
            Utc::now() - chrono::Duration::hours(11),
            Duration::from_secs(36_000),
        );
        store.put(DOMAINS_NAMESPACE, LOOKUP_KEY, stale).unwrap();

        let lookup = cache(directory.clone(), store);
        let table = lookup.table().await.unwrap();
        assert!(!table.contains("oldwiki"));
        assert!(table.contains("enwiki"));
        assert_eq!(directory.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let directory = Arc::new(FakeDirectory::new(0));
        let lookup = cache(directory.clone(), Arc::new(MemoryStore::new()));

        lookup.table().await.unwrap();
        lookup.invalidate();
        lookup.table().await.unwrap();
        assert_eq!(directory.calls(), 2);
    }
}
