//! Query construction
//!
//! This module provides:
//! - `SearchQuery`, the validated, immutable description of a user search
//! - `SearchRequestBody`, the typed CirrusSearch request derived from it
//! - `build`, the pure translation between the two

mod body;
mod types;

pub use body::{
    BoolFilter, BoolQuery, FilterClause, HighlightConfig, HighlightField, HighlightOptions,
    MatchClause, NamespaceTerms, SearchRequestBody, SourceRegexClause, TitleRegexp, build,
};
pub use types::{
    MAX_REGEX_RESULTS, MAX_RESULTS, POST_TAG, PRE_TAG, SearchQuery, escape_regex_literal,
    parse_namespaces,
};
