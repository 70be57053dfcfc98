//! Caching
//!
//! Two independent namespaces share one store:
//! - `results`: complete result sets keyed by query fingerprint (minutes)
//! - `domains`: the site-id to hostname table, a single entry (hours)

mod entry;
mod results;
mod store;

use std::sync::Arc;

use crate::config::{CacheBackend, Config};
use crate::error::{Error, Result};

pub use entry::CacheEntry;
pub use results::{RESULTS_NAMESPACE, ResultCache, fingerprint};
pub use store::{CacheStore, FileStore, MemoryStore, TtlCache};

/// Open the store selected by the `[cache]` configuration section
pub fn open_store(config: &Config) -> Result<Arc<dyn CacheStore>> {
    match config.cache.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        CacheBackend::File => {
            let dir = Config::cache_dir().map_err(|e| Error::ConfigError(e.to_string()))?;
            Ok(Arc::new(FileStore::new(dir)))
        }
    }
}
