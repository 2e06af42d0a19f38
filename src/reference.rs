use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::syntax::{definition_line, is_http_url};

/// A parsed `[^n]: [link text](url)` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteDefinition {
    pub number: String,
    pub link_text: String,
    pub url: String,
}

impl FootnoteDefinition {
    /// Parse the first definition found on `line`. Only http(s) URLs are accepted.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = definition_line().captures(line)?;
        let url = caps.get(3)?.as_str();
        if !is_http_url(url) {
            return None;
        }
        Some(Self {
            number: caps.get(1)?.as_str().to_string(),
            link_text: caps.get(2)?.as_str().to_string(),
            url: url.to_string(),
        })
    }

    /// Like [`FootnoteDefinition::parse`], but the definition must open the (left-trimmed) line.
    pub fn parse_leading(line: &str) -> Option<Self> {
        let line = line.trim_start();
        let m = definition_line().find(line)?;
        if m.start() != 0 {
            return None;
        }
        Self::parse(line)
    }
}

/// Footnote number to URL lookup, built fresh from the canonical References section on every
/// render pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReferenceMap {
    urls: BTreeMap<String, String>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `section` line by line. Later definitions of the same number replace earlier ones.
    pub fn build(section: &str) -> Self {
        let mut map = Self::new();
        for line in section.lines() {
            match FootnoteDefinition::parse(line) {
                Some(def) => {
                    map.insert(def.number, def.url);
                }
                None => {
                    if line.trim_start().starts_with("[^") {
                        tracing::trace!(line, "skipping unresolvable definition line");
                    }
                }
            }
        }
        map
    }

    /// Returns the previous URL for `number`, if any.
    pub fn insert(&mut self, number: String, url: String) -> Option<String> {
        match self.urls.entry(number) {
            Entry::Vacant(v) => {
                v.insert(url);
                None
            }
            Entry::Occupied(mut o) => Some(o.insert(url)),
        }
    }

    pub fn get(&self, number: &str) -> Option<&str> {
        self.urls.get(number).map(String::as_str)
    }

    pub fn contains(&self, number: &str) -> bool {
        self.urls.contains_key(number)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }
}
