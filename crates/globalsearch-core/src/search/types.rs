//! Inbound parameters and the result set

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::FormattedHit;
use crate::query::SearchQuery;

/// Parameters of a single search, as supplied by a front end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub regex: bool,
    pub ignore_case: bool,
    pub namespaces: Vec<i32>,
    pub title: Option<String>,
    /// Skip the result cache and overwrite it
    pub purge: bool,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn regex(mut self, regex: bool) -> Self {
        self.regex = regex;
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn namespaces(mut self, namespaces: Vec<i32>) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn purge(mut self, purge: bool) -> Self {
        self.purge = purge;
        self
    }

    /// Validate into an immutable query
    pub fn to_query(&self) -> Result<SearchQuery> {
        SearchQuery::new(
            self.query.clone(),
            self.namespaces.iter().copied(),
            self.regex,
            self.ignore_case,
            self.title.clone(),
        )
    }
}

/// Everything a renderer needs for one search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Matches reported by the engine, which may exceed `hits.len()`
    pub total: u64,
    pub hits: Vec<FormattedHit>,
    pub query: String,
    pub regex: bool,
    pub ignore_case: bool,
    pub title: Option<String>,
    pub namespaces: Vec<i32>,
    pub max_results: u32,
    /// Set by the result cache only
    #[serde(default)]
    pub from_cache: bool,
}

impl ResultSet {
    pub fn new(query: &SearchQuery, total: u64, hits: Vec<FormattedHit>) -> Self {
        Self {
            total,
            hits,
            query: query.query().to_string(),
            regex: query.is_regex(),
            ignore_case: query.ignore_case(),
            title: query.title_pattern().map(str::to_string),
            namespaces: query.namespaces().iter().copied().collect(),
            max_results: query.max_results(),
            from_cache: false,
        }
    }

    /// Whether the engine matched more documents than were returned
    pub fn is_truncated(&self) -> bool {
        self.total > self.hits.len() as u64
    }
}
