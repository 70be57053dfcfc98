//! Site identifier resolution
//!
//! Hits name their source by database name (`enwiki`); the formatter
//! needs the public hostname (`en.wikipedia.org`). The full mapping comes
//! from the MediaWiki site matrix and is cached for hours.

mod cache;
mod directory;
mod table;

pub use cache::{DOMAINS_NAMESPACE, DomainLookupCache};
pub use directory::{SiteDirectory, SiteMatrixClient};
pub use table::{DomainLookupTable, WIKI_NOT_FOUND, parse_sitematrix};
