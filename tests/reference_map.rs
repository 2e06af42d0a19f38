use reportcite::{FootnoteDefinition, Options, ReferenceMap, SectionLayout};

fn map_for(document: &str) -> ReferenceMap {
    let opts = Options::default();
    let layout = SectionLayout::locate(document, &opts);
    ReferenceMap::build(layout.canonical_section())
}

#[test]
fn only_http_definitions_are_mapped() {
    let doc = "# Acme Research Report\n\nBody [^1] and [^2].\n\n## References\n\n\
               [^1]: [Annual report](https://acme.com/ar)\n\n\
               [^2]: [Intranet](ftp://acme.local/doc)\n\n\
               [^3]: no link here\n\n\
               [^4]: [Blog](http://blog.acme.com/post)\n\n\
               Some trailing prose.\n";
    let map = map_for(doc);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("1"), Some("https://acme.com/ar"));
    assert_eq!(map.get("4"), Some("http://blog.acme.com/post"));
    assert!(!map.contains("2"));
    assert!(!map.contains("3"));
}

#[test]
fn later_definition_wins_within_section() {
    let doc = "## References\n\n[^1]: [Old](https://old.example)\n[^1]: [New](https://new.example)\n";
    let map = map_for(doc);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("1"), Some("https://new.example"));
}

#[test]
fn document_without_references_yields_empty_map() {
    let doc = "# Report\n\nClaims [^1].\n\n[^1]: [A](https://a.com)\n";
    assert!(map_for(doc).is_empty());
}

#[test]
fn only_last_section_contributes() {
    let doc = "## References\n\n[^1]: [A](https://a.com)\n[^2]: [Only early](https://early.com)\n\n\
               ## References\n\n[^1]: [B](https://b.com)\n";
    let map = map_for(doc);
    assert_eq!(map.get("1"), Some("https://b.com"));
    assert!(!map.contains("2"));
    assert_eq!(map.iter().collect::<Vec<_>>(), vec![("1", "https://b.com")]);
}

#[test]
fn definition_parsing() {
    let def = FootnoteDefinition::parse("[^12]: [Quarterly results](https://ir.example.com/q3)").unwrap();
    assert_eq!(def.number, "12");
    assert_eq!(def.link_text, "Quarterly results");
    assert_eq!(def.url, "https://ir.example.com/q3");

    assert!(FootnoteDefinition::parse("[^x]: [A](https://a.com)").is_none());
    assert!(FootnoteDefinition::parse("[^1]: [A](mailto:a@b.c)").is_none());
    assert!(FootnoteDefinition::parse("[^1] [A](https://a.com)").is_none());

    assert!(FootnoteDefinition::parse_leading("  [^1]: [A](https://a.com)").is_some());
    assert!(FootnoteDefinition::parse_leading("see [^1]: [A](https://a.com)").is_none());
}
