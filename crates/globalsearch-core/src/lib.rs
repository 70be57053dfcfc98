//! GlobalSearch Core Library
//!
//! This crate provides the search pipeline behind GlobalSearch:
//! - Query building (CirrusSearch request bodies, plain and regex)
//! - Search client (Elasticsearch `_search` over HTTP)
//! - Result formatting with highlight markup
//! - Result caching keyed by query fingerprint
//! - Site identifier to hostname lookup from the MediaWiki site matrix

pub mod cache;
pub mod config;
pub mod domains;
pub mod elastic;
pub mod error;
pub mod format;
pub mod query;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::search::{ResultSet, SearchParams, SearchService};
}
