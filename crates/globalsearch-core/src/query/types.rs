//! Search query value object

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Opening sentinel the engine wraps around matched text
pub const PRE_TAG: &str = "%**%";

/// Closing sentinel the engine wraps around matched text
pub const POST_TAG: &str = "*%%*";

/// Hit cap for plain full-text queries
pub const MAX_RESULTS: u32 = 5000;

/// Hit cap for regex queries; their cost scales with corpus size
pub const MAX_REGEX_RESULTS: u32 = 100;

/// Characters with special meaning in Lucene regular expressions
const LUCENE_RESERVED: &[char] = &[
    '.', '?', '+', '*', '|', '{', '}', '[', ']', '(', ')', '"', '\\', '#', '@', '&', '<', '>',
    '~', '^', '$',
];

/// A validated search request
///
/// Fields are private: once built, a query cannot change. A query wrapped
/// in double quotes is rewritten into an exact-match regex at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QueryFields")]
pub struct SearchQuery {
    query: String,
    namespaces: BTreeSet<i32>,
    regex: bool,
    ignore_case: bool,
    title_pattern: Option<String>,
}

/// Unvalidated wire form; deserialization goes through `SearchQuery::new`
#[derive(Deserialize)]
struct QueryFields {
    #[serde(default)]
    query: String,
    #[serde(default)]
    namespaces: Vec<i32>,
    #[serde(default)]
    regex: bool,
    #[serde(default)]
    ignore_case: bool,
    #[serde(default)]
    title_pattern: Option<String>,
}

impl TryFrom<QueryFields> for SearchQuery {
    type Error = Error;

    fn try_from(fields: QueryFields) -> Result<Self> {
        Self::new(
            fields.query,
            fields.namespaces,
            fields.regex,
            fields.ignore_case,
            fields.title_pattern,
        )
    }
}

impl SearchQuery {
    /// Create a query, applying the quoted exact-match rewrite
    ///
    /// Fails with `InvalidInput` when there is neither body text nor a
    /// title pattern, since such a query would scan every document.
    pub fn new(
        query: impl Into<String>,
        namespaces: impl IntoIterator<Item = i32>,
        regex: bool,
        ignore_case: bool,
        title_pattern: Option<String>,
    ) -> Result<Self> {
        let mut query = query.into();
        let mut regex = regex;
        let mut ignore_case = ignore_case;

        if let Some(inner) = strip_wrapping_quotes(&query) {
            query = escape_regex_literal(inner);
            regex = true;
            ignore_case = false;
        }

        let title_pattern = title_pattern.filter(|p| !p.is_empty());

        if query.trim().is_empty() && title_pattern.is_none() {
            return Err(Error::InvalidInput(
                "a search needs query text or a title pattern".to_string(),
            ));
        }

        Ok(Self {
            query,
            namespaces: namespaces.into_iter().collect(),
            regex,
            ignore_case,
            title_pattern,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Namespace ids in ascending order; empty means all namespaces
    pub fn namespaces(&self) -> &BTreeSet<i32> {
        &self.namespaces
    }

    pub fn is_regex(&self) -> bool {
        self.regex
    }

    /// Case folding only applies to regex searches
    pub fn ignore_case(&self) -> bool {
        self.regex && self.ignore_case
    }

    pub fn title_pattern(&self) -> Option<&str> {
        self.title_pattern.as_deref()
    }

    /// Maximum number of hits requested from the engine
    pub fn max_results(&self) -> u32 {
        if self.regex {
            MAX_REGEX_RESULTS
        } else {
            MAX_RESULTS
        }
    }
}

fn strip_wrapping_quotes(query: &str) -> Option<&str> {
    if query.len() >= 2 && query.starts_with('"') && query.ends_with('"') {
        Some(&query[1..query.len() - 1])
    } else {
        None
    }
}

/// Escape text so that a Lucene regex matches it literally
pub fn escape_regex_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if LUCENE_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Parse a comma-separated namespace list such as `"0,2,4"`
///
/// Blank input means all namespaces.
pub fn parse_namespaces(param: &str) -> Result<Vec<i32>> {
    if param.trim().is_empty() {
        return Ok(Vec::new());
    }

    param
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|_| Error::InvalidInput(format!("invalid namespace id '{}'", part)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_query_keeps_flags() {
        let query = SearchQuery::new("foo", [], false, false, None).unwrap();
        assert_eq!(query.query(), "foo");
        assert!(!query.is_regex());
        assert_eq!(query.max_results(), MAX_RESULTS);
    }

    #[test]
    fn test_quoted_query_becomes_case_sensitive_regex() {
        let query = SearchQuery::new("\"a.b (c)\"", [], false, true, None).unwrap();
        assert!(query.is_regex());
        assert!(!query.ignore_case());
        assert_eq!(query.query(), r"a\.b \(c\)");
        assert_eq!(query.max_results(), MAX_REGEX_RESULTS);
    }

    #[test]
    fn test_lone_quote_is_not_rewritten() {
        let query = SearchQuery::new("\"", [], false, false, None).unwrap();
        assert!(!query.is_regex());
        assert_eq!(query.query(), "\"");
    }

    #[test]
    fn test_ignore_case_only_applies_to_regex() {
        let plain = SearchQuery::new("foo", [], false, true, None).unwrap();
        assert!(!plain.ignore_case());

        let regex = SearchQuery::new("fo+", [], true, true, None).unwrap();
        assert!(regex.ignore_case());
    }

    #[test]
    fn test_namespaces_are_sorted_and_deduplicated() {
        let query = SearchQuery::new("foo", [4, 2, 4, 0], false, false, None).unwrap();
        let ids: Vec<i32> = query.namespaces().iter().copied().collect();
        assert_eq!(ids, vec![0, 2, 4]);
    }

    #[test]
    fn test_empty_query_without_title_is_rejected() {
        let err = SearchQuery::new("", [], false, false, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = SearchQuery::new("", [], true, false, Some(String::new())).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_blank_query_without_title_is_rejected() {
        let err = SearchQuery::new("   ", [], false, false, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = SearchQuery::new("\t\n", [], true, false, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<SearchQuery>(
            r#"{"query": "", "namespaces": [], "regex": false, "ignore_case": false, "title_pattern": null}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid input"));

        let query: SearchQuery = serde_json::from_str(
            r#"{"query": "\"a.b\"", "namespaces": [4, 0], "regex": false, "ignore_case": true}"#,
        )
        .unwrap();
        assert!(query.is_regex());
        assert!(!query.ignore_case());
        assert_eq!(query.query(), r"a\.b");
        assert_eq!(query.namespaces().iter().copied().collect::<Vec<_>>(), vec![0, 4]);
    }

    #[test]
    fn test_serialized_query_reloads_unchanged() {
        let query =
            SearchQuery::new("\"x|y\"", [2], false, false, Some("^A".to_string())).unwrap();
        let json = serde_json::to_string(&query).unwrap();
        let reloaded: SearchQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, query);
    }

    #[test]
    fn test_title_only_query_is_accepted() {
        let query = SearchQuery::new("", [], false, false, Some("^Foo".to_string())).unwrap();
        assert_eq!(query.query(), "");
        assert_eq!(query.title_pattern(), Some("^Foo"));
    }

    #[test]
    fn test_escape_regex_literal() {
        assert_eq!(escape_regex_literal("plain words"), "plain words");
        assert_eq!(escape_regex_literal("a+b*c?"), r"a\+b\*c\?");
        assert_eq!(escape_regex_literal("{{Infobox}}"), r"\{\{Infobox\}\}");
        assert_eq!(escape_regex_literal("<ref>"), r"\<ref\>");
        assert_eq!(escape_regex_literal(r"C:\dir"), r"C:\\dir");
    }

    #[test]
    fn test_parse_namespaces() {
        assert_eq!(parse_namespaces("").unwrap(), Vec::<i32>::new());
        assert_eq!(parse_namespaces("0,2, 4").unwrap(), vec![0, 2, 4]);
        assert_eq!(parse_namespaces("1,,3").unwrap(), vec![1, 3]);
        assert!(matches!(
            parse_namespaces("1,main").unwrap_err(),
            Error::InvalidInput(_)
        ));
    }
}
