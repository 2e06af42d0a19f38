use std::ops::Range;

use crate::reference::ReferenceMap;
use crate::syntax::citation_marker;

/// An inline `[^n(,n)*]` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationMarker {
    label: String,
    numbers: Vec<String>,
}

impl CitationMarker {
    /// Parse a complete marker token such as `[^3,4]`.
    pub fn parse(token: &str) -> Option<Self> {
        let caps = citation_marker().captures(token)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() != token.len() {
            return None;
        }
        Some(Self::from_label(caps.get(1)?.as_str()))
    }

    fn from_label(label: &str) -> Self {
        Self {
            label: label.to_string(),
            numbers: label.split(',').map(str::to_string).collect(),
        }
    }

    /// The raw number list, e.g. `"3,4"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn numbers(&self) -> &[String] {
        &self.numbers
    }

    /// Activation always targets the first listed number.
    pub fn first_number(&self) -> &str {
        self.numbers.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Marker(CitationMarker),
}

/// Every marker in `text`, with its byte range.
pub fn find_markers(text: &str) -> impl Iterator<Item = (Range<usize>, CitationMarker)> + '_ {
    citation_marker().captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let label = caps.get(1)?;
        Some((whole.range(), CitationMarker::from_label(label.as_str())))
    })
}

/// Split a text leaf into literal text and markers, in source order.
///
/// Returns `None` when the leaf has no marker and should pass through unchanged. Empty literal
/// runs between adjacent markers are dropped.
pub fn split_citations(text: &str) -> Option<Vec<Segment<'_>>> {
    let mut out = Vec::new();
    let mut last = 0usize;
    for (range, marker) in find_markers(text) {
        if range.start > last {
            out.push(Segment::Text(&text[last..range.start]));
        }
        out.push(Segment::Marker(marker));
        last = range.end;
    }
    if out.is_empty() {
        return None;
    }
    if last < text.len() {
        out.push(Segment::Text(&text[last..]));
    }
    Some(out)
}

/// One interactive citation control resolved against a [`ReferenceMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationControl {
    pub marker: CitationMarker,
    /// URL of the first listed number, if it has one.
    pub target: Option<String>,
    /// `[n]: url` per resolvable number, newline-joined; unresolved numbers are omitted.
    pub tooltip: String,
}

impl CitationControl {
    pub fn resolve(marker: CitationMarker, map: &ReferenceMap) -> Self {
        let target = map.get(marker.first_number()).map(str::to_string);
        let tooltip = tooltip_for(&marker, map);
        Self {
            marker,
            target,
            tooltip,
        }
    }

    pub fn label(&self) -> &str {
        self.marker.label()
    }
}

pub fn tooltip_for(marker: &CitationMarker, map: &ReferenceMap) -> String {
    marker
        .numbers()
        .iter()
        .filter_map(|n| map.get(n).map(|url| format!("[{n}]: {url}")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_tokens_only() {
        let m = CitationMarker::parse("[^3,4]").unwrap();
        assert_eq!(m.label(), "3,4");
        assert_eq!(m.numbers(), &["3".to_string(), "4".to_string()]);
        assert_eq!(m.first_number(), "3");
        assert!(CitationMarker::parse("x [^3]").is_none());
        assert!(CitationMarker::parse("[^a]").is_none());
        assert!(CitationMarker::parse("[^1,]").is_none());
    }

    #[test]
    fn adjacent_markers_have_no_empty_text_between() {
        let segments = split_citations("[^1][^2]").unwrap();
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| matches!(s, Segment::Marker(_))));
    }
}
