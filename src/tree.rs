use crate::citation::CitationControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingVariant {
    /// Level-1 heading naming the report title.
    Title,
    /// Any other level-1 heading.
    Section,
    /// Levels 2 and below; fixed styling scaled by level.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    /// Opens in a new isolated browsing context (no opener, no referrer).
    pub external: bool,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading {
        level: u8,
        variant: HeadingVariant,
        id: Option<String>,
        children: Vec<Node>,
    },
    Divider,
    Paragraph(Vec<Node>),
    /// Anchor-addressable footnote block: `[number]` label followed by its link.
    FootnoteDefinition {
        id: String,
        number: String,
        link: Link,
    },
    List(Vec<Node>),
    ListItem(Vec<Node>),
    Link(Link),
    Citation(CitationControl),
    Text(String),
    Block(Vec<Node>),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph(children)
            | Node::List(children)
            | Node::ListItem(children)
            | Node::Block(children) => children,
            Node::Link(link) | Node::FootnoteDefinition { link, .. } => &link.children,
            Node::Divider | Node::Citation(_) | Node::Text(_) => &[],
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Node::Heading { id, .. } => id.as_deref(),
            Node::FootnoteDefinition { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Concatenated visible text; citations contribute their label.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            Node::Citation(c) => out.push_str(c.label()),
            Node::FootnoteDefinition { number, link, .. } => {
                out.push('[');
                out.push_str(number);
                out.push_str("] ");
                for child in &link.children {
                    child.push_plain_text(out);
                }
            }
            other => {
                for child in other.children() {
                    child.push_plain_text(out);
                }
            }
        }
    }

    /// Depth-first, pre-order traversal including `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Output of one render pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderTree {
    pub nodes: Vec<Node>,
}

impl RenderTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flat_map(Node::descendants)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.iter().find(|n| n.id() == Some(id))
    }

    pub fn citations(&self) -> impl Iterator<Item = &CitationControl> {
        self.iter().filter_map(|n| match n {
            Node::Citation(c) => Some(c),
            _ => None,
        })
    }

    pub fn headings(&self) -> impl Iterator<Item = &Node> {
        self.iter().filter(|n| matches!(n, Node::Heading { .. }))
    }

    pub fn plain_text(&self) -> String {
        self.nodes.iter().map(Node::plain_text).collect::<Vec<_>>().join("\n")
    }
}
