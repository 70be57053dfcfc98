//! Cache entries with time-to-live

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value stamped with its creation time and lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl<T> CacheEntry<T> {
    /// Create an entry that starts its lifetime now
    pub fn new(value: T, ttl: Duration) -> Self {
        Self::created_at(value, Utc::now(), ttl)
    }

    /// Create an entry with an explicit creation time
    pub fn created_at(value: T, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            created_at,
            ttl_secs: ttl.as_secs(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(ttl)
            .and_then(|ttl| self.created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_is_live() {
        let entry = CacheEntry::new("v", Duration::from_secs(600));
        assert!(!entry.is_expired());
        assert_eq!(entry.ttl_secs, 600);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let created = Utc::now() - chrono::Duration::minutes(11);
        let entry = CacheEntry::created_at(1u8, created, Duration::from_secs(600));
        assert!(entry.is_expired());
        assert!(!entry.is_expired_at(created + chrono::Duration::minutes(9)));
        assert!(entry.is_expired_at(created + chrono::Duration::minutes(10)));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let entry = CacheEntry::created_at((), Utc::now(), Duration::from_secs(u64::MAX));
        assert!(!entry.is_expired());
    }
}
