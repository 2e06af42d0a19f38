use reportcite::{
    CitationControl, CitationMarker, Node, Options, ReferenceMap, RenderContext, RenderOverrides,
    Segment, split_citations, tooltip_for,
};

fn map(entries: &[(&str, &str)]) -> ReferenceMap {
    let mut map = ReferenceMap::new();
    for (n, url) in entries {
        map.insert(n.to_string(), url.to_string());
    }
    map
}

#[test]
fn leaf_without_markers_passes_through() {
    assert!(split_citations("No citations here [1] or [^a].").is_none());

    let opts = Options::default();
    let ctx = RenderContext::new("", &opts);
    assert_eq!(
        ctx.text("No citations here."),
        vec![Node::text("No citations here.")]
    );
}

#[test]
fn leaf_is_split_in_order() {
    let segments = split_citations("Sales rose 12%[^3] while costs fell[^4,5].").unwrap();
    assert_eq!(segments.len(), 5);
    assert_eq!(segments[0], Segment::Text("Sales rose 12%"));
    assert!(matches!(&segments[1], Segment::Marker(m) if m.label() == "3"));
    assert_eq!(segments[2], Segment::Text(" while costs fell"));
    assert!(matches!(&segments[3], Segment::Marker(m) if m.label() == "4,5"));
    assert_eq!(segments[4], Segment::Text("."));
}

#[test]
fn control_targets_first_number() {
    let refs = map(&[("3", "https://x/3"), ("4", "https://x/4")]);
    let control = CitationControl::resolve(CitationMarker::parse("[^3,4]").unwrap(), &refs);
    assert_eq!(control.label(), "3,4");
    assert_eq!(control.target.as_deref(), Some("https://x/3"));
    assert_eq!(control.tooltip, "[3]: https://x/3\n[4]: https://x/4");

    let control = CitationControl::resolve(CitationMarker::parse("[^9,3]").unwrap(), &refs);
    assert_eq!(control.target, None);
    assert_eq!(control.tooltip, "[3]: https://x/3");
}

#[test]
fn tooltip_omits_unmapped_numbers() {
    let refs = map(&[("1", "https://one.example")]);
    let marker = CitationMarker::parse("[^1,2]").unwrap();
    let tooltip = tooltip_for(&marker, &refs);
    assert_eq!(tooltip, "[1]: https://one.example");
    assert!(!tooltip.contains("[2]"));
    assert_eq!(tooltip.lines().count(), 1);
}

#[test]
fn context_rewrites_text_leaf_against_canonical_map() {
    let opts = Options::default();
    let doc = "Growth[^1].\n\n## References\n\n[^1]: [Filing](https://sec.example/f)\n";
    let ctx = RenderContext::new(doc, &opts);
    let nodes = ctx.text("Growth[^1].");
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0], Node::text("Growth"));
    match &nodes[1] {
        Node::Citation(c) => {
            assert_eq!(c.label(), "1");
            assert_eq!(c.target.as_deref(), Some("https://sec.example/f"));
            assert_eq!(c.tooltip, "[1]: https://sec.example/f");
        }
        other => panic!("expected citation, got {other:?}"),
    }
    assert_eq!(nodes[2], Node::text("."));
}

#[test]
fn fully_unmapped_marker_has_no_target_and_empty_tooltip() {
    let refs = map(&[("1", "https://one.example")]);
    let control = CitationControl::resolve(CitationMarker::parse("[^7,8]").unwrap(), &refs);
    assert_eq!(control.label(), "7,8");
    assert_eq!(control.target, None);
    assert!(control.tooltip.is_empty());
}
