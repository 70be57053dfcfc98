//! Remote search engine integration
//!
//! This module provides:
//! - `SearchBackend`, the seam between the pipeline and the engine
//! - `SearchClient`, the HTTP implementation for CirrusSearch clusters
//! - Response types, with `hits.total` normalized at the boundary

mod client;
mod types;

pub use client::{SearchBackend, SearchClient, SearchClientBuilder};
pub use types::{
    HIGHLIGHT_FIELD, HitSource, HitsTotal, RawHit, RawHits, RawSearchResponse, SearchResponse,
    normalize_total,
};
