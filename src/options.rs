use crate::error::OptionsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Heading text naming the References section.
    pub references_heading: String,
    /// Literal delimiter the document is split on to find References sections.
    pub references_delimiter: String,
    /// First-level headings containing this phrase render as the title variant.
    pub title_phrase: String,
    /// Footnote anchors are addressed as `{prefix}{number}`.
    pub footnote_anchor_prefix: String,
    /// Identifier of the rendered canonical References heading.
    pub references_anchor_id: String,
    /// If true, the body of a non-canonical References section is dropped along with its heading.
    pub suppress_duplicate_sections: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            references_heading: "References".to_string(),
            references_delimiter: "## References\n\n".to_string(),
            title_phrase: "Research Report".to_string(),
            footnote_anchor_prefix: "footnote-".to_string(),
            references_anchor_id: "references".to_string(),
            suppress_duplicate_sections: true,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.references_heading.trim().is_empty() {
            return Err(OptionsError::EmptyReferencesHeading);
        }
        if self.references_delimiter.is_empty() {
            return Err(OptionsError::EmptyDelimiter);
        }
        if !self.references_delimiter.contains(&self.references_heading) {
            return Err(OptionsError::DelimiterMissingHeading {
                delimiter: self.references_delimiter.clone(),
                heading: self.references_heading.clone(),
            });
        }
        if self.footnote_anchor_prefix.is_empty() {
            return Err(OptionsError::EmptyAnchorPrefix);
        }
        Ok(())
    }

    pub(crate) fn names_title(&self, heading_text: &str) -> bool {
        !self.title_phrase.is_empty() && heading_text.contains(self.title_phrase.as_str())
    }
}
