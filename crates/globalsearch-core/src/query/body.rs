//! CirrusSearch request body
//!
//! The shapes here serialize to the JSON accepted by the `_search`
//! endpoint of a CirrusSearch cluster, including its `source_regex`
//! extension and the `experimental` highlighter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{POST_TAG, PRE_TAG, SearchQuery};

/// Engine-side time budget for a single search
const ENGINE_TIMEOUT: &str = "150s";

/// Automaton size cap protecting the cluster from pathological patterns
const MAX_DETERMINIZED_STATES: u32 = 20_000;

/// Ngram expansion cap for the trigram accelerator
const MAX_EXPAND: u32 = 10;

/// Locale pinned so case folding is deterministic
const REGEX_LOCALE: &str = "en";

/// Fragment length for regex highlights
const REGEX_FRAGMENT_SIZE: u32 = 150;

const TEXT_FIELD: &str = "source_text";
const PLAIN_TEXT_FIELD: &str = "source_text.plain";
const TRIGRAM_FIELD: &str = "source_text.trigram";
const HIGHLIGHTER: &str = "experimental";
const STATS_GROUP: &str = "global-search";

/// Complete `_search` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequestBody {
    pub timeout: String,
    pub size: u32,
    #[serde(rename = "_source")]
    pub source: Vec<String>,
    pub query: BoolQuery,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<String>>,
    pub highlight: HighlightConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(rename = "bool")]
    pub bool_query: BoolFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolFilter {
    pub filter: Vec<FilterClause>,
}

/// One entry of the `bool.filter` list; all entries must match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterClause {
    Match(MatchClause),
    SourceRegex(SourceRegexClause),
    Terms(NamespaceTerms),
    Regexp(TitleRegexp),
}

/// Full-text match against the plain-text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchClause {
    #[serde(rename = "source_text.plain")]
    pub text: String,
}

/// Regex over the source text, accelerated by the trigram index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRegexClause {
    pub regex: String,
    pub field: String,
    pub ngram_field: String,
    pub max_determinized_states: u32,
    pub max_expand: u32,
    pub case_sensitive: bool,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceTerms {
    pub namespace: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRegexp {
    #[serde(rename = "title.keyword")]
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    pub pre_tags: Vec<String>,
    pub post_tags: Vec<String>,
    pub fields: BTreeMap<String, HighlightField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_query: Option<FilterClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightField {
    #[serde(rename = "type")]
    pub highlighter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_fragments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragmenter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<HighlightOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightOptions {
    pub regex: Vec<String>,
    pub locale: String,
    pub regex_flavor: String,
    pub skip_query: bool,
    pub regex_case_insensitive: bool,
    pub max_determinized_states: u32,
}

impl SearchRequestBody {
    /// The filter list, main clause first
    pub fn filters(&self) -> &[FilterClause] {
        &self.query.bool_query.filter
    }

    fn push_filter(&mut self, clause: FilterClause) {
        self.query.bool_query.filter.push(clause);
    }
}

/// Translate a query into the request body sent to the engine
pub fn build(query: &SearchQuery) -> SearchRequestBody {
    let mut body = if query.is_regex() {
        regex_body(query)
    } else {
        plain_body(query)
    };

    if !query.namespaces().is_empty() {
        body.push_filter(FilterClause::Terms(NamespaceTerms {
            namespace: query.namespaces().iter().copied().collect(),
        }));
    }

    if let Some(pattern) = query.title_pattern() {
        body.push_filter(FilterClause::Regexp(TitleRegexp {
            pattern: pattern.to_string(),
        }));
    }

    body
}

fn plain_body(query: &SearchQuery) -> SearchRequestBody {
    let clause = FilterClause::Match(MatchClause {
        text: query.query().to_string(),
    });

    SearchRequestBody {
        timeout: ENGINE_TIMEOUT.to_string(),
        size: query.max_results(),
        source: source_fields(),
        query: BoolQuery {
            bool_query: BoolFilter {
                filter: vec![clause.clone()],
            },
        },
        stats: Some(vec![STATS_GROUP.to_string()]),
        highlight: HighlightConfig {
            pre_tags: vec![PRE_TAG.to_string()],
            post_tags: vec![POST_TAG.to_string()],
            fields: single_field(HighlightField {
                highlighter: HIGHLIGHTER.to_string(),
                number_of_fragments: None,
                fragmenter: None,
                fragment_size: None,
                options: None,
            }),
            highlight_query: Some(clause),
        },
    }
}

fn regex_body(query: &SearchQuery) -> SearchRequestBody {
    let ignore_case = query.ignore_case();

    let clause = FilterClause::SourceRegex(SourceRegexClause {
        regex: query.query().to_string(),
        field: TEXT_FIELD.to_string(),
        ngram_field: TRIGRAM_FIELD.to_string(),
        max_determinized_states: MAX_DETERMINIZED_STATES,
        max_expand: MAX_EXPAND,
        case_sensitive: !ignore_case,
        locale: REGEX_LOCALE.to_string(),
    });

    SearchRequestBody {
        timeout: ENGINE_TIMEOUT.to_string(),
        size: query.max_results(),
        source: source_fields(),
        query: BoolQuery {
            bool_query: BoolFilter {
                filter: vec![clause],
            },
        },
        stats: None,
        highlight: HighlightConfig {
            pre_tags: vec![PRE_TAG.to_string()],
            post_tags: vec![POST_TAG.to_string()],
            fields: single_field(HighlightField {
                highlighter: HIGHLIGHTER.to_string(),
                number_of_fragments: Some(1),
                fragmenter: Some("scan".to_string()),
                fragment_size: Some(REGEX_FRAGMENT_SIZE),
                options: Some(HighlightOptions {
                    regex: vec![query.query().to_string()],
                    locale: REGEX_LOCALE.to_string(),
                    regex_flavor: "lucene".to_string(),
                    skip_query: true,
                    regex_case_insensitive: ignore_case,
                    max_determinized_states: MAX_DETERMINIZED_STATES,
                }),
            }),
            highlight_query: None,
        },
    }
}

fn source_fields() -> Vec<String> {
    ["wiki", "namespace_text", "title"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

fn single_field(field: HighlightField) -> BTreeMap<String, HighlightField> {
    let mut fields = BTreeMap::new();
    fields.insert(PLAIN_TEXT_FIELD.to_string(), field);
    fields
}
