//! Site identifier to hostname table

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Returned for site ids missing from the directory
pub const WIKI_NOT_FOUND: &str = "WIKINOTFOUND";

/// Family that lists its sites directly instead of under `site`
const SPECIALS_KEY: &str = "specials";

/// Metadata entry in the site matrix that is not a family
const COUNT_KEY: &str = "count";

/// Immutable map from site id (e.g. `enwiki`) to hostname
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainLookupTable {
    domains: HashMap<String, String>,
}

impl DomainLookupTable {
    pub fn new(domains: HashMap<String, String>) -> Self {
        Self { domains }
    }

    /// Hostname for `site_id`, or `WIKINOTFOUND`
    pub fn resolve(&self, site_id: &str) -> &str {
        self.domains
            .get(site_id)
            .map(String::as_str)
            .unwrap_or(WIKI_NOT_FOUND)
    }

    pub fn contains(&self, site_id: &str) -> bool {
        self.domains.contains_key(site_id)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl FromIterator<(String, String)> for DomainLookupTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Flatten a `sitematrix` API response into a lookup table
///
/// Language families nest their sites under `site`; `specials` is a bare
/// list; `count` is skipped. Entries without a usable `dbname` or `url`
/// are ignored.
pub fn parse_sitematrix(response: &Value) -> Result<DomainLookupTable> {
    let matrix = response
        .get("sitematrix")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::LoadFailure("response has no `sitematrix` object".to_string()))?;

    let mut domains = HashMap::new();

    for (key, family) in matrix {
        if key == COUNT_KEY {
            continue;
        }

        let sites = if key == SPECIALS_KEY {
            family.as_array()
        } else {
            family.get("site").and_then(Value::as_array)
        };

        for site in sites.into_iter().flatten() {
            let dbname = site.get("dbname").and_then(Value::as_str);
            let host = site
                .get("url")
                .and_then(Value::as_str)
                .and_then(|url| Url::parse(url).ok())
                .and_then(|url| url.host_str().map(str::to_string));

            if let (Some(dbname), Some(host)) = (dbname, host) {
                domains.insert(dbname.to_string(), host);
            }
        }
    }

    Ok(DomainLookupTable::new(domains))
}
