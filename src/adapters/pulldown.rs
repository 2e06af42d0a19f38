use std::ops::Range;

use pulldown_cmark::{Event, Options as PulldownOptions, Parser, Tag};

use crate::render::{HeadingInput, RenderOverrides};
use crate::syntax::EscapedSource;
use crate::tree::{Node, RenderTree};

#[derive(Debug, Clone)]
pub struct PulldownAdapterOptions {
    pub pulldown: PulldownOptions,
}

impl Default for PulldownAdapterOptions {
    fn default() -> Self {
        Self {
            pulldown: PulldownOptions::ENABLE_TABLES
                | PulldownOptions::ENABLE_STRIKETHROUGH
                | PulldownOptions::ENABLE_TASKLISTS,
        }
    }
}

/// Drives `pulldown-cmark` over a report and assembles a [`RenderTree`] through
/// [`RenderOverrides`].
#[derive(Debug, Default, Clone)]
pub struct PulldownAdapter {
    opts: PulldownAdapterOptions,
}

impl PulldownAdapter {
    pub fn new(opts: PulldownAdapterOptions) -> Self {
        Self { opts }
    }

    pub fn convert<R>(&self, document: &str, overrides: &R) -> RenderTree
    where
        R: RenderOverrides + ?Sized,
    {
        let source = EscapedSource::new(document);
        let mut builder = TreeBuilder::new(&source, overrides);
        for (event, range) in Parser::new_ext(source.as_str(), self.opts.pulldown).into_offset_iter()
        {
            builder.event(event, range);
        }
        builder.finish()
    }
}

/// Convert with the default adapter options.
pub fn convert<R>(document: &str, overrides: &R) -> RenderTree
where
    R: RenderOverrides + ?Sized,
{
    PulldownAdapter::default().convert(document, overrides)
}

#[derive(Debug)]
enum FrameKind {
    Root,
    Heading(u8),
    Paragraph,
    List,
    Item,
    Link(String),
    /// Emphasis and friends: children are spliced into the parent.
    Inline,
    /// Code block: text is kept verbatim.
    Code,
    Block,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Range in the escaped source.
    range: Range<usize>,
    children: Vec<Node>,
    /// Adjacent text events, coalesced before the text override sees them.
    text: String,
}

impl Frame {
    fn new(kind: FrameKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
            text: String::new(),
        }
    }
}

struct TreeBuilder<'s, 'd, R: ?Sized> {
    source: &'s EscapedSource<'d>,
    overrides: &'s R,
    stack: Vec<Frame>,
    /// Nesting depth inside a suppressed top-level block.
    suppressed: usize,
}

impl<'s, 'd, R> TreeBuilder<'s, 'd, R>
where
    R: RenderOverrides + ?Sized,
{
    fn new(source: &'s EscapedSource<'d>, overrides: &'s R) -> Self {
        Self {
            source,
            overrides,
            stack: vec![Frame::new(FrameKind::Root, 0..source.as_str().len())],
            suppressed: 0,
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        if self.suppressed > 0 {
            match event {
                Event::Start(_) => self.suppressed += 1,
                Event::End(_) => self.suppressed -= 1,
                _ => {}
            }
            return;
        }
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(_) => self.end(),
            Event::Text(text) if self.in_code() => {
                let source = self.source;
                self.push_text(&source.unescape(range, &text));
            }
            Event::Text(text) => self.push_text(&text),
            Event::SoftBreak | Event::HardBreak => self.push_text("\n"),
            Event::Code(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.flush_text();
                let literal = self.source.unescape(range, &text).into_owned();
                self.push_nodes(vec![Node::Text(literal)]);
            }
            Event::TaskListMarker(checked) => self.push_text(if checked { "[x] " } else { "[ ] " }),
            Event::Rule => {
                if !self.suppresses_top_level(&range) {
                    self.push_nodes(vec![Node::Divider]);
                }
            }
            _ => {}
        }
    }

    fn suppresses_top_level(&self, range: &Range<usize>) -> bool {
        self.stack.len() == 1
            && self
                .overrides
                .suppresses(self.source.to_original_offset(range.start))
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        self.flush_text();
        if self.suppresses_top_level(&range) {
            self.suppressed = 1;
            return;
        }
        let kind = match tag {
            Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::List(_) => FrameKind::List,
            Tag::Item => FrameKind::Item,
            Tag::Link { dest_url, .. } => FrameKind::Link(dest_url.into_string()),
            Tag::CodeBlock(_) => FrameKind::Code,
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Image { .. } => {
                FrameKind::Inline
            }
            _ => FrameKind::Block,
        };
        self.stack.push(Frame::new(kind, range));
    }

    fn end(&mut self) {
        self.flush_text();
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let nodes = self.close(frame);
        self.push_nodes(nodes);
    }

    fn close(&self, frame: Frame) -> Vec<Node> {
        let Frame {
            kind,
            range,
            children,
            ..
        } = frame;
        match kind {
            FrameKind::Heading(level) => {
                let text: String = children.iter().map(Node::plain_text).collect();
                let heading = HeadingInput {
                    level,
                    text: text.trim(),
                    source_offset: self.source.to_original_offset(range.start),
                };
                self.overrides.heading(heading, children)
            }
            FrameKind::Paragraph => self
                .overrides
                .paragraph(self.source.original_slice(range), children),
            FrameKind::List => vec![self.overrides.list(children)],
            FrameKind::Item => vec![self.overrides.list_item(children)],
            FrameKind::Link(href) => self.overrides.link(&href, children).into_iter().collect(),
            FrameKind::Inline | FrameKind::Root => children,
            FrameKind::Code | FrameKind::Block => vec![self.overrides.block(children)],
        }
    }

    fn in_code(&self) -> bool {
        matches!(self.stack.last(), Some(Frame { kind: FrameKind::Code, .. }))
    }

    fn current(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_text(&mut self, text: &str) {
        self.current().text.push_str(text);
    }

    fn push_nodes(&mut self, nodes: Vec<Node>) {
        self.current().children.extend(nodes);
    }

    fn flush_text(&mut self) {
        let frame = self.current();
        if frame.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut frame.text);
        let verbatim = matches!(frame.kind, FrameKind::Code);
        let nodes = if verbatim {
            vec![Node::Text(text)]
        } else {
            self.overrides.text(&text)
        };
        self.push_nodes(nodes);
    }

    fn finish(mut self) -> RenderTree {
        self.flush_text();
        while self.stack.len() > 1 {
            self.end();
        }
        let root = self.stack.pop().map(|f| f.children).unwrap_or_default();
        RenderTree::new(root)
    }
}
