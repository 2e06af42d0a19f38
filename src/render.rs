//! Render overrides supplied to an external Markdown-to-tree converter.
//!
//! A converter walks its own parse of the report and hands each node to a [`RenderOverrides`]
//! implementation, keyed by node type. [`RenderContext`] is the implementation for reports: it
//! owns everything derived from one document (section layout, reference map) and is rebuilt on
//! every render pass.

use crate::citation::{CitationControl, CitationMarker, Segment, split_citations};
use crate::error::OptionsError;
use crate::navigate::{CitationClickHandler, NavigationOutcome, Navigator};
use crate::options::Options;
use crate::reference::{FootnoteDefinition, ReferenceMap};
use crate::section::{HeadingDisposition, SectionLayout};
use crate::syntax::{footnote_anchor_id, is_http_url};
use crate::tree::{HeadingVariant, Link, Node, RenderTree};

/// What a converter knows about a heading when it asks for its rendering.
#[derive(Debug, Clone, Copy)]
pub struct HeadingInput<'s> {
    pub level: u8,
    /// Plain text of the heading.
    pub text: &'s str,
    /// Byte offset of the heading in the original document.
    pub source_offset: usize,
}

pub trait RenderOverrides {
    /// Headings of every level. May render nothing, or more than one node.
    fn heading(&self, heading: HeadingInput<'_>, children: Vec<Node>) -> Vec<Node>;

    /// `source` is the original Markdown of the paragraph.
    fn paragraph(&self, source: &str, children: Vec<Node>) -> Vec<Node>;

    fn list(&self, items: Vec<Node>) -> Node {
        Node::List(items)
    }

    fn list_item(&self, children: Vec<Node>) -> Node {
        Node::ListItem(children)
    }

    fn link(&self, href: &str, children: Vec<Node>) -> Option<Node>;

    /// Text leaves.
    fn text(&self, text: &str) -> Vec<Node>;

    /// Anything the converter has no dedicated override for.
    fn block(&self, children: Vec<Node>) -> Node {
        Node::Block(children)
    }

    /// Blocks starting at this original-document offset are dropped entirely.
    fn suppresses(&self, _source_offset: usize) -> bool {
        false
    }
}

/// Per-pass state for rendering one report document.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    options: &'a Options,
    layout: SectionLayout<'a>,
    references: ReferenceMap,
}

impl<'a> RenderContext<'a> {
    pub fn new(document: &'a str, options: &'a Options) -> Self {
        let layout = SectionLayout::locate(document, options);
        let references = ReferenceMap::build(layout.canonical_section());
        Self {
            options,
            layout,
            references,
        }
    }

    pub fn layout(&self) -> &SectionLayout<'a> {
        &self.layout
    }

    pub fn reference_map(&self) -> &ReferenceMap {
        &self.references
    }

    pub fn into_reference_map(self) -> ReferenceMap {
        self.references
    }

    pub fn click_handler(&self) -> CitationClickHandler<'_> {
        CitationClickHandler::new(&self.references, self.options)
    }

    fn heading_variant(&self, heading: &HeadingInput<'_>) -> HeadingVariant {
        match heading.level {
            1 if self.options.names_title(heading.text) => HeadingVariant::Title,
            1 => HeadingVariant::Section,
            _ => HeadingVariant::Plain,
        }
    }

    fn footnote_block(&self, def: FootnoteDefinition) -> Node {
        Node::FootnoteDefinition {
            id: footnote_anchor_id(&self.options.footnote_anchor_prefix, &def.number),
            number: def.number,
            link: Link {
                external: is_http_url(&def.url),
                href: def.url,
                children: vec![Node::Text(def.link_text)],
            },
        }
    }
}

impl RenderOverrides for RenderContext<'_> {
    fn heading(&self, heading: HeadingInput<'_>, children: Vec<Node>) -> Vec<Node> {
        let disposition = self
            .layout
            .heading_disposition(heading.text, heading.source_offset);
        if !disposition.renders() {
            return Vec::new();
        }
        let is_references = disposition == HeadingDisposition::Canonical;
        let node = Node::Heading {
            level: heading.level,
            variant: self.heading_variant(&heading),
            id: is_references.then(|| self.options.references_anchor_id.clone()),
            children,
        };
        if is_references {
            vec![node, Node::Divider]
        } else {
            vec![node]
        }
    }

    fn paragraph(&self, source: &str, children: Vec<Node>) -> Vec<Node> {
        let lines: Vec<&str> = source.lines().filter(|l| !l.trim().is_empty()).collect();
        let defs: Vec<Option<FootnoteDefinition>> = lines
            .iter()
            .map(|line| FootnoteDefinition::parse_leading(line))
            .collect();
        if defs.iter().all(Option::is_none) {
            return vec![Node::Paragraph(children)];
        }

        // Definition lines become footnote blocks; the remaining lines stay paragraph content,
        // in source order.
        let mut rendered = split_lines(children);
        if rendered.len() != lines.len() {
            rendered = lines.iter().map(|line| self.text(line.trim())).collect();
        }
        let mut out = Vec::new();
        let mut prose: Vec<Node> = Vec::new();
        for (def, line) in defs.into_iter().zip(rendered) {
            match def {
                Some(def) => {
                    if !prose.is_empty() {
                        out.push(Node::Paragraph(std::mem::take(&mut prose)));
                    }
                    out.push(self.footnote_block(def));
                }
                None => {
                    if !prose.is_empty() {
                        prose.push(Node::text("\n"));
                    }
                    prose.extend(line);
                }
            }
        }
        if !prose.is_empty() {
            out.push(Node::Paragraph(prose));
        }
        out
    }

    fn link(&self, href: &str, children: Vec<Node>) -> Option<Node> {
        // Footnote-style links (`[[^n]](...)`) never render; the citation control covers them.
        let visible: String = children.iter().map(Node::plain_text).collect();
        if matches!(children.first(), Some(Node::Citation(_))) || visible.starts_with("[^") {
            return None;
        }
        Some(Node::Link(Link {
            href: href.to_string(),
            external: is_http_url(href),
            children,
        }))
    }

    fn text(&self, text: &str) -> Vec<Node> {
        let Some(segments) = split_citations(text) else {
            return vec![Node::text(text)];
        };
        segments
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(s) => Node::text(s),
                Segment::Marker(marker) => {
                    Node::Citation(CitationControl::resolve(marker, &self.references))
                }
            })
            .collect()
    }

    fn suppresses(&self, source_offset: usize) -> bool {
        self.options.suppress_duplicate_sections && self.layout.is_in_duplicate(source_offset)
    }
}

/// Inline nodes grouped by the line breaks inside their text leaves.
fn split_lines(nodes: Vec<Node>) -> Vec<Vec<Node>> {
    let mut lines: Vec<Vec<Node>> = vec![Vec::new()];
    for node in nodes {
        match node {
            Node::Text(text) => {
                for (i, part) in text.split('\n').enumerate() {
                    if i > 0 {
                        lines.push(Vec::new());
                    }
                    if part.is_empty() {
                        continue;
                    }
                    if let Some(line) = lines.last_mut() {
                        line.push(Node::text(part));
                    }
                }
            }
            other => {
                if let Some(line) = lines.last_mut() {
                    line.push(other);
                }
            }
        }
    }
    lines
}

/// The tree and reference map produced by one render pass.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub tree: RenderTree,
    pub references: ReferenceMap,
    options: Options,
}

impl RenderedReport {
    pub fn new(tree: RenderTree, references: ReferenceMap, options: Options) -> Self {
        Self {
            tree,
            references,
            options,
        }
    }

    pub fn click_handler(&self) -> CitationClickHandler<'_> {
        CitationClickHandler::new(&self.references, &self.options)
    }

    pub fn activate<N: Navigator>(
        &self,
        marker: &CitationMarker,
        navigator: &N,
    ) -> NavigationOutcome {
        self.click_handler().activate(marker, navigator)
    }
}

/// Renders report documents with a fixed, validated [`Options`].
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    options: Options,
}

impl ReportRenderer {
    pub fn new(options: Options) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Derive the per-pass state for `document` without converting it.
    pub fn context<'a>(&'a self, document: &'a str) -> RenderContext<'a> {
        RenderContext::new(document, &self.options)
    }

    /// Render `document`. An empty or whitespace-only document renders nothing.
    #[cfg(feature = "pulldown")]
    pub fn render(&self, document: &str) -> Option<RenderedReport> {
        if document.trim().is_empty() {
            tracing::debug!("empty report; nothing to render");
            return None;
        }
        let context = self.context(document);
        let tree = crate::adapters::pulldown::convert(document, &context);
        Some(RenderedReport::new(
            tree,
            context.into_reference_map(),
            self.options.clone(),
        ))
    }
}

/// Render an optional report with default options; an absent document renders nothing.
#[cfg(feature = "pulldown")]
pub fn render_report(document: Option<&str>) -> Option<RenderedReport> {
    ReportRenderer::default().render(document?)
}
