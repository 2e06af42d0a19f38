use crate::citation::{CitationControl, CitationMarker};
use crate::options::Options;
use crate::reference::ReferenceMap;
use crate::syntax::{footnote_anchor_id, is_http_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScrollBehavior {
    Smooth,
}

/// Isolation flags for a newly opened browsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
    pub no_opener: bool,
    pub no_referrer: bool,
}

impl OpenFlags {
    pub const ISOLATED: Self = Self {
        no_opener: true,
        no_referrer: true,
    };
}

/// Document navigation and browsing-context capabilities used by citation activation.
///
/// The render tree may still be mutating (e.g. a report streaming in) while a citation is
/// activated; `locate_by_id` returning `None` for a node that has not rendered yet is expected.
pub trait Navigator {
    type Node;

    fn locate_by_id(&self, id: &str) -> Option<Self::Node>;

    fn scroll_into_view(&self, node: &Self::Node, behavior: ScrollBehavior);

    /// Open `url` in a new browsing context. Callers always pass [`OpenFlags::ISOLATED`].
    fn open_external(&self, url: &str, flags: OpenFlags);
}

/// Which step of the fallback chain handled an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    OpenedExternal(String),
    ScrolledToAnchor(String),
    ScrolledToReferences,
    Unresolved,
}

/// Resolves activated citations: open URL, else scroll to the footnote anchor, else scroll to
/// the References heading, else nothing. No step retries and none of them can fail.
#[derive(Debug, Clone, Copy)]
pub struct CitationClickHandler<'a> {
    map: &'a ReferenceMap,
    options: &'a Options,
}

impl<'a> CitationClickHandler<'a> {
    pub fn new(map: &'a ReferenceMap, options: &'a Options) -> Self {
        Self { map, options }
    }

    pub fn activate<N: Navigator>(
        &self,
        marker: &CitationMarker,
        navigator: &N,
    ) -> NavigationOutcome {
        let number = marker.first_number();
        let outcome = self.navigate(number, navigator);
        tracing::debug!(citation = marker.label(), number, ?outcome, "citation activated");
        outcome
    }

    pub fn activate_control<N: Navigator>(
        &self,
        control: &CitationControl,
        navigator: &N,
    ) -> NavigationOutcome {
        self.activate(&control.marker, navigator)
    }

    fn navigate<N: Navigator>(&self, number: &str, navigator: &N) -> NavigationOutcome {
        if let Some(url) = self.map.get(number).filter(|url| is_http_url(url)) {
            navigator.open_external(url, OpenFlags::ISOLATED);
            return NavigationOutcome::OpenedExternal(url.to_string());
        }

        let anchor = footnote_anchor_id(&self.options.footnote_anchor_prefix, number);
        if let Some(node) = navigator.locate_by_id(&anchor) {
            navigator.scroll_into_view(&node, ScrollBehavior::Smooth);
            return NavigationOutcome::ScrolledToAnchor(anchor);
        }

        if let Some(node) = navigator.locate_by_id(&self.options.references_anchor_id) {
            navigator.scroll_into_view(&node, ScrollBehavior::Smooth);
            return NavigationOutcome::ScrolledToReferences;
        }

        NavigationOutcome::Unresolved
    }
}
