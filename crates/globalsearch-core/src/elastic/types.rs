//! Search engine response types
//!
//! `RawSearchResponse` mirrors the wire format, including both observed
//! shapes of `hits.total`. Everything past the client sees only the
//! normalized `SearchResponse`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field whose highlight fragments become the snippet
pub const HIGHLIGHT_FIELD: &str = "source_text.plain";

/// Response body as returned by `_search`
#[derive(Debug, Clone, Deserialize)]
pub struct RawSearchResponse {
    pub hits: RawHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHits {
    pub total: HitsTotal,
    pub hits: Vec<RawHit>,
}

/// `hits.total` as either `{"value": N, ...}` or a bare integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HitsTotal {
    Object { value: u64 },
    Legacy(u64),
}

/// A single hit, consumed read-only by the formatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_source")]
    pub source: HitSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitSource {
    /// Site identifier, e.g. `enwiki`
    pub wiki: String,
    #[serde(default)]
    pub namespace_text: Option<String>,
    pub title: String,
}

impl RawHit {
    /// First highlighted fragment of the source text, if any
    pub fn snippet(&self) -> Option<&str> {
        self.highlight
            .as_ref()
            .and_then(|h| h.get(HIGHLIGHT_FIELD))
            .and_then(|fragments| fragments.first())
            .map(String::as_str)
    }
}

/// Normalized response handed to the formatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: u64,
    pub hits: Vec<RawHit>,
}

/// Collapse either `hits.total` shape into a count
pub fn normalize_total(total: HitsTotal) -> u64 {
    match total {
        HitsTotal::Object { value } => value,
        HitsTotal::Legacy(value) => value,
    }
}

impl From<RawSearchResponse> for SearchResponse {
    fn from(raw: RawSearchResponse) -> Self {
        Self {
            total: normalize_total(raw.hits.total),
            hits: raw.hits.hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_total_is_normalized() {
        let raw: RawSearchResponse = serde_json::from_str(
            r#"{"took": 12, "hits": {"total": {"value": 42, "relation": "eq"}, "hits": []}}"#,
        )
        .unwrap();
        assert_eq!(SearchResponse::from(raw).total, 42);
    }

    #[test]
    fn test_legacy_total_is_normalized() {
        let raw: RawSearchResponse =
            serde_json::from_str(r#"{"hits": {"total": 7, "hits": []}}"#).unwrap();
        assert_eq!(SearchResponse::from(raw).total, 7);
    }

    #[test]
    fn test_missing_total_is_rejected() {
        let raw = serde_json::from_str::<RawSearchResponse>(r#"{"hits": {"hits": []}}"#);
        assert!(raw.is_err());
    }

    #[test]
    fn test_missing_hit_list_is_rejected() {
        let raw = serde_json::from_str::<RawSearchResponse>(r#"{"hits": {"total": {"value": 5}}}"#);
        let err = raw.unwrap_err();
        assert!(err.to_string().contains("missing field `hits`"));
    }

    #[test]
    fn test_hit_snippet() {
        let hit: RawHit = serde_json::from_str(
            r#"{
                "_source": {"wiki": "enwiki", "namespace_text": "", "title": "Foo"},
                "highlight": {"source_text.plain": ["first %**%foo*%%*", "second"]}
            }"#,
        )
        .unwrap();
        assert_eq!(hit.snippet(), Some("first %**%foo*%%*"));
        assert_eq!(hit.source.namespace_text.as_deref(), Some(""));
    }

    #[test]
    fn test_hit_without_highlight() {
        let hit: RawHit = serde_json::from_str(
            r#"{"_source": {"wiki": "dewiki", "namespace_text": null, "title": "Bar"}}"#,
        )
        .unwrap();
        assert_eq!(hit.snippet(), None);
        assert_eq!(hit.source.namespace_text, None);
    }
}
