//! Cache storage backends
//!
//! Entries are stored as JSON values grouped by namespace. `MemoryStore`
//! lives for the process; `FileStore` keeps one file per entry so that
//! separate invocations share results.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

use super::entry::CacheEntry;
use crate::error::{Error, Result};

/// Storage for serialized cache entries
pub trait CacheStore: Send + Sync {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry<Value>>>;

    fn put(&self, namespace: &str, key: &str, entry: CacheEntry<Value>) -> Result<()>;

    fn remove(&self, namespace: &str, key: &str) -> Result<()>;

    /// Remove every entry in every namespace
    fn clear(&self) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(String, String), CacheEntry<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Cache("memory store lock poisoned".to_string())
}

impl CacheStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry<Value>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn put(&self, namespace: &str, key: &str, entry: CacheEntry<Value>) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert((namespace.to_string(), key.to_string()), entry);
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

/// Directory-backed store: `<root>/<namespace>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, namespace: &str, key: &str) -> Result<PathBuf> {
        validate_segment(namespace)?;
        validate_segment(key)?;
        Ok(self.root.join(namespace).join(format!("{}.json", key)))
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::Cache(format!("invalid cache key '{}'", segment)))
    }
}

impl CacheStore for FileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry<Value>>> {
        let path = self.entry_path(namespace, key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, namespace: &str, key: &str, entry: CacheEntry<Value>) -> Result<()> {
        let path = self.entry_path(namespace, key)?;
        let dir = self.root.join(namespace);
        fs::create_dir_all(&dir)?;

        // Write then rename so readers never see a partial file
        let tmp = dir.join(format!(".{}.tmp", key));
        fs::write(&tmp, serde_json::to_vec(&entry)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<()> {
        let path = self.entry_path(namespace, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Typed view over one namespace of a store, applying a fixed TTL
///
/// Storage faults are logged and treated as misses; a broken cache never
/// fails a search.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn CacheStore>,
    namespace: &'static str,
    ttl: Duration,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("namespace", &self.namespace)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TtlCache {
    pub fn new(store: Arc<dyn CacheStore>, namespace: &'static str, ttl: Duration) -> Self {
        Self {
            store,
            namespace,
            ttl,
        }
    }

    /// Live value for `key`; expired or undecodable entries are dropped
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = match self.store.get(self.namespace, key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!(namespace = self.namespace, error = %e, "Cache read failed");
                return None;
            }
        };

        if entry.is_expired() {
            debug!(namespace = self.namespace, key, "Cache entry expired");
            self.evict(key);
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(namespace = self.namespace, error = %e, "Discarding undecodable cache entry");
                self.evict(key);
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_value(value)
            .map_err(Error::from)
            .and_then(|v| self.store.put(self.namespace, key, CacheEntry::new(v, self.ttl)));
        if let Err(e) = result {
            warn!(namespace = self.namespace, error = %e, "Cache write failed");
        }
    }

    pub fn evict(&self, key: &str) {
        if let Err(e) = self.store.remove(self.namespace, key) {
            warn!(namespace = self.namespace, error = %e, "Cache eviction failed");
        }
    }
}
