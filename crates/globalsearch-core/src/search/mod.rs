//! Search orchestration
//!
//! `SearchService::search` validates the parameters, consults the result
//! cache and, on a miss, runs a `SearchPipeline`:
//! build body, execute, resolve domains (lazily) and format.

mod pipeline;
mod service;
mod types;

pub use pipeline::SearchPipeline;
pub use service::SearchService;
pub use types::{ResultSet, SearchParams};
