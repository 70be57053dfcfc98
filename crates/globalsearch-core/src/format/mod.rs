//! Result formatting
//!
//! Turns raw engine hits into display-ready rows: namespace-qualified
//! title, owning wiki, canonical URL and an HTML-safe snippet with the
//! matched spans wrapped in `<span class='highlight'>`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domains::{DomainLookupTable, WIKI_NOT_FOUND};
use crate::elastic::{RawHit, SearchResponse};
use crate::query::{POST_TAG, PRE_TAG};

const HIGHLIGHT_OPEN: &str = "<span class='highlight'>";
const HIGHLIGHT_CLOSE: &str = "</span>";

/// One display-ready search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedHit {
    /// Owning wiki's hostname without the `.org` suffix
    pub wiki: String,
    pub title: String,
    pub url: String,
    /// Escaped snippet with highlight markup
    pub source_text: String,
}

/// Format every hit, preserving engine order
pub fn format(response: &SearchResponse, lookup: &DomainLookupTable) -> Vec<FormattedHit> {
    response
        .hits
        .iter()
        .map(|hit| format_hit(hit, lookup))
        .collect()
}

/// Format a single hit; an unknown wiki degrades to `WIKINOTFOUND`
pub fn format_hit(hit: &RawHit, lookup: &DomainLookupTable) -> FormattedHit {
    let title = display_title(hit);
    let domain = lookup.resolve(&hit.source.wiki);
    if domain == WIKI_NOT_FOUND {
        warn!(wiki = %hit.source.wiki, "Unresolvable site identifier");
    }

    FormattedHit {
        wiki: display_domain(domain).to_string(),
        url: page_url(domain, &title),
        source_text: highlight(hit.snippet().unwrap_or_default()),
        title,
    }
}

fn display_title(hit: &RawHit) -> String {
    match hit.source.namespace_text.as_deref() {
        Some(ns) if !ns.is_empty() => format!("{}:{}", ns, hit.source.title),
        _ => hit.source.title.clone(),
    }
}

/// Hostname shown to the user, e.g. `en.wikipedia`
pub fn display_domain(domain: &str) -> &str {
    domain.strip_suffix(".org").unwrap_or(domain)
}

/// Canonical page URL; the title is left as stored by the engine
pub fn page_url(domain: &str, title: &str) -> String {
    format!("https://{}/wiki/{}", domain, title)
}

/// Escape `text` for HTML, then swap the sentinel tags for markup
///
/// Escaping runs first so the inserted markup is never escaped itself.
pub fn highlight(text: &str) -> String {
    replace_sentinels(&escape_html(text))
}

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

// Single left-to-right pass: text produced by one replacement is never
// rescanned, and overlapping sentinel candidates resolve by position.
fn replace_sentinels(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix(PRE_TAG) {
            out.push_str(HIGHLIGHT_OPEN);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(POST_TAG) {
            out.push_str(HIGHLIGHT_CLOSE);
            rest = tail;
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elastic::HitSource;
    use std::collections::HashMap;

    fn hit(wiki: &str, ns: Option<&str>, title: &str, snippet: Option<&str>) -> RawHit {
        RawHit {
            source: HitSource {
                wiki: wiki.to_string(),
                namespace_text: ns.map(str::to_string),
                title: title.to_string(),
            },
            highlight: snippet.map(|s| {
                HashMap::from([("source_text.plain".to_string(), vec![s.to_string()])])
            }),
        }
    }

    fn lookup() -> DomainLookupTable {
        [
            ("enwiki".to_string(), "en.wikipedia.org".to_string()),
            ("metawiki".to_string(), "meta.wikimedia.org".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_escape_then_wrap() {
        let out = highlight("a < b %**%x<y*%%* c");
        assert_eq!(out, "a &lt; b <span class='highlight'>x&lt;y</span> c");
        assert_eq!(out.matches(HIGHLIGHT_OPEN).count(), 1);
        assert_eq!(out.matches('<').count(), 2);
    }

    #[test]
    fn test_markup_in_source_is_neutralized() {
        let out = highlight("<span class='highlight'>fake</span> & \"q\"");
        assert!(!out.contains("<span"));
        assert_eq!(
            out,
            "&lt;span class=&#039;highlight&#039;&gt;fake&lt;/span&gt; &amp; &quot;q&quot;"
        );
    }

    #[test]
    fn test_sentinels_resolve_left_to_right() {
        assert_eq!(highlight("*%%**%"), "</span>*%");
        assert_eq!(highlight("%**%%**%"), format!("{0}{0}", HIGHLIGHT_OPEN));
    }

    #[test]
    fn test_format_hit_with_namespace() {
        let row = format_hit(
            &hit("enwiki", Some("Talk"), "Foo bar", Some("%**%foo*%%* bar")),
            &lookup(),
        );
        assert_eq!(row.wiki, "en.wikipedia");
        assert_eq!(row.title, "Talk:Foo bar");
        assert_eq!(row.url, "https://en.wikipedia.org/wiki/Talk:Foo bar");
        assert_eq!(row.source_text, "<span class='highlight'>foo</span> bar");
    }

    #[test]
    fn test_format_hit_without_namespace_or_highlight() {
        let row = format_hit(&hit("metawiki", Some(""), "Main Page", None), &lookup());
        assert_eq!(row.wiki, "meta.wikimedia");
        assert_eq!(row.title, "Main Page");
        assert_eq!(row.source_text, "");
    }

    #[test]
    fn test_unknown_wiki_does_not_disturb_batch() {
        let response = SearchResponse {
            total: 3,
            hits: vec![
                hit("enwiki", None, "A", Some("a")),
                hit("ghostwiki", None, "B", Some("b")),
                hit("metawiki", None, "C", Some("c")),
            ],
        };
        let rows = format(&response, &lookup());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].url, "https://en.wikipedia.org/wiki/A");
        assert_eq!(rows[1].wiki, WIKI_NOT_FOUND);
        assert_eq!(rows[1].url, "https://WIKINOTFOUND/wiki/B");
        assert_eq!(rows[2].wiki, "meta.wikimedia");
        assert_eq!(rows[2].title, "C");
    }

    #[test]
    fn test_display_domain_only_strips_org_suffix() {
        assert_eq!(display_domain("www.wikidata.org"), "www.wikidata");
        assert_eq!(display_domain("wikitech.wikimedia.org"), "wikitech.wikimedia");
        assert_eq!(display_domain("example.com"), "example.com");
    }
}
