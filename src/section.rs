//! Canonical References section selection.
//!
//! Generated reports sometimes repeat their References section. Only the last occurrence is
//! authoritative: it alone feeds the reference map and it alone renders a heading.

use std::ops::Range;

use crate::options::Options;
use crate::syntax::atx_heading_level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingDisposition {
    /// The heading does not name the References section.
    NotReferences,
    /// The heading is the canonical References heading and renders (followed by a divider).
    Canonical,
    /// An earlier References heading; it renders nothing.
    Suppressed,
}

impl HeadingDisposition {
    pub fn renders(self) -> bool {
        !matches!(self, HeadingDisposition::Suppressed)
    }
}

#[derive(Debug, Clone)]
pub struct SectionLayout<'a> {
    document: &'a str,
    heading: &'a str,
    delimiter_len: usize,
    /// Heading level of the delimiter line, if the delimiter is an ATX heading.
    delimiter_level: Option<usize>,
    /// Byte offsets of every delimiter occurrence, ascending.
    occurrences: Vec<usize>,
    duplicates: Vec<Range<usize>>,
}

impl<'a> SectionLayout<'a> {
    pub fn locate(document: &'a str, options: &'a Options) -> Self {
        let delimiter = options.references_delimiter.as_str();
        let occurrences: Vec<usize> = if delimiter.is_empty() {
            Vec::new()
        } else {
            document.match_indices(delimiter).map(|(at, _)| at).collect()
        };
        if occurrences.len() > 1 {
            tracing::debug!(
                occurrences = occurrences.len(),
                canonical_offset = occurrences.last().copied(),
                "duplicate references sections; keeping the last"
            );
        }
        let mut layout = Self {
            document,
            heading: options.references_heading.as_str(),
            delimiter_len: delimiter.len(),
            delimiter_level: atx_heading_level(delimiter),
            occurrences,
            duplicates: Vec::new(),
        };
        layout.duplicates = layout.find_duplicate_ranges();
        layout
    }

    pub fn occurrences(&self) -> &[usize] {
        &self.occurrences
    }

    pub fn is_duplicated(&self) -> bool {
        self.occurrences.len() > 1
    }

    /// Offset of the delimiter that opens the canonical section.
    pub fn canonical_offset(&self) -> Option<usize> {
        self.occurrences.last().copied()
    }

    /// Text following the last delimiter, or `""` when the document has no References section.
    pub fn canonical_section(&self) -> &'a str {
        match self.canonical_offset() {
            Some(at) => &self.document[at + self.delimiter_len..],
            None => "",
        }
    }

    /// Byte ranges covered by every non-canonical References section.
    ///
    /// A duplicate section runs from its delimiter to the next heading of the same or higher rank,
    /// or to the next delimiter, whichever comes first.
    pub fn duplicate_ranges(&self) -> &[Range<usize>] {
        &self.duplicates
    }

    fn find_duplicate_ranges(&self) -> Vec<Range<usize>> {
        self.occurrences
            .windows(2)
            .map(|pair| {
                let (start, next) = (pair[0], pair[1]);
                let body = start + self.delimiter_len;
                let end = self.next_heading_at_or_above(body, next).unwrap_or(next);
                start..end
            })
            .collect()
    }

    fn next_heading_at_or_above(&self, from: usize, limit: usize) -> Option<usize> {
        let rank = self.delimiter_level?;
        let mut at = from;
        for line in self.document[from..limit].split_inclusive('\n') {
            if atx_heading_level(line).is_some_and(|level| level <= rank) {
                return Some(at);
            }
            at += line.len();
        }
        None
    }

    pub fn is_in_duplicate(&self, offset: usize) -> bool {
        self.duplicates.iter().any(|r| r.contains(&offset))
    }

    pub fn names_references(&self, heading_text: &str) -> bool {
        !self.heading.is_empty() && heading_text.contains(self.heading)
    }

    /// Decide whether a heading with `heading_text`, starting at byte `source_offset` of the
    /// document, may render.
    pub fn heading_disposition(
        &self,
        heading_text: &str,
        source_offset: usize,
    ) -> HeadingDisposition {
        if !self.names_references(heading_text) {
            return HeadingDisposition::NotReferences;
        }
        match self.canonical_offset() {
            None => HeadingDisposition::Canonical,
            Some(at) if at == source_offset => HeadingDisposition::Canonical,
            Some(_) => HeadingDisposition::Suppressed,
        }
    }
}
