//! Output structure tests
//!
//! Generated fragments are parsed back with html5ever and checked as a DOM
//! tree, so nesting and attributes are verified the way a browser sees them
//! rather than by string matching.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markdown_html_converter::convert;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use proptest::prelude::*;

fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

fn tag_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref().to_string()),
        _ => None,
    }
}

fn attribute(node: &Handle, attr_name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// All elements named `tag`, in document order
fn find_all(node: &Handle, tag: &str, found: &mut Vec<Handle>) {
    if tag_name(node).as_deref() == Some(tag) {
        found.push(node.clone());
    }
    for child in node.children.borrow().iter() {
        find_all(child, tag, found);
    }
}

fn elements(dom: &RcDom, tag: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    find_all(&dom.document, tag, &mut found);
    found
}

/// Concatenated text of a node and its descendants
fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, text: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        text.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, text);
    }
}

/// Text directly owned by a node, ignoring nested elements
fn own_text(node: &Handle) -> String {
    node.children
        .borrow()
        .iter()
        .filter_map(|child| match child.data {
            NodeData::Text { ref contents } => Some(contents.borrow().to_string()),
            _ => None,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Each `<li>` with its own text and the number of `<ul>` ancestors
fn list_items_with_depth(node: &Handle, ul_depth: usize, items: &mut Vec<(String, usize)>) {
    let name = tag_name(node);
    if name.as_deref() == Some("li") {
        items.push((own_text(node), ul_depth));
    }
    let depth = if name.as_deref() == Some("ul") {
        ul_depth + 1
    } else {
        ul_depth
    };
    for child in node.children.borrow().iter() {
        list_items_with_depth(child, depth, items);
    }
}

fn convert_for_test(markdown: &str) -> String {
    convert(markdown).expect("Conversion failed")
}

#[test]
fn test_three_level_list_nesting() {
    let html = convert_for_test("- one\n  - two\n    - three\n  - four\n- five");
    let dom = parse(&html);

    let mut items = Vec::new();
    list_items_with_depth(&dom.document, 0, &mut items);
    assert_eq!(
        items,
        vec![
            ("one".to_string(), 1),
            ("two".to_string(), 2),
            ("three".to_string(), 3),
            ("four".to_string(), 2),
            ("five".to_string(), 1),
        ]
    );
}

#[test]
fn test_ordered_and_unordered_lists_are_separate() {
    let html = convert_for_test("- a\n1. b\n2. c");
    let dom = parse(&html);
    assert_eq!(elements(&dom, "ul").len(), 1);
    assert_eq!(elements(&dom, "ol").len(), 1);
    assert_eq!(elements(&dom, "li").len(), 3);
}

#[test]
fn test_table_alignment_attributes() {
    let html = convert_for_test("| A | B |\n|---|---:|\n| 1 | 2 |");
    let dom = parse(&html);

    let headers = elements(&dom, "th");
    assert_eq!(headers.len(), 2);
    assert_eq!(attribute(&headers[0], "style"), None);
    assert_eq!(
        attribute(&headers[1], "style").as_deref(),
        Some("text-align: right")
    );

    let cells = elements(&dom, "td");
    assert_eq!(cells.len(), 2);
    assert_eq!(attribute(&cells[0], "style"), None);
    assert_eq!(
        attribute(&cells[1], "style").as_deref(),
        Some("text-align: right")
    );
}

#[test]
fn test_blockquote_wraps_table() {
    let html = convert_for_test("> text\n> | A | B |\n> |---|---|\n> | 1 | 2 |");
    let dom = parse(&html);

    let quotes = elements(&dom, "blockquote");
    assert_eq!(quotes.len(), 1);
    let mut tables = Vec::new();
    find_all(&quotes[0], "table", &mut tables);
    assert_eq!(tables.len(), 1);
    assert_eq!(elements(&dom, "table").len(), 1);
    assert!(text_content(&quotes[0]).contains("text"));
}

#[test]
fn test_code_inside_list_item_stays_code() {
    let html = convert_for_test("- run `make *all*`");
    let dom = parse(&html);
    let code = elements(&dom, "code");
    assert_eq!(code.len(), 1);
    assert_eq!(text_content(&code[0]), "make *all*");
    assert!(elements(&dom, "em").is_empty());
}

#[test]
fn test_heading_ids_are_unique_attributes() {
    let converter = markdown_html_converter::HtmlConverter::with_options(
        markdown_html_converter::ConversionOptions {
            heading_ids: true,
            ..Default::default()
        },
    );
    let html = converter
        .convert("# API\n\n## Usage\n\n## Usage\n\n## _Private_ API")
        .expect("Conversion failed");
    let dom = parse(&html);

    let ids: Vec<String> = ["h1", "h2"]
        .iter()
        .flat_map(|tag| elements(&dom, tag))
        .filter_map(|node| attribute(&node, "id"))
        .collect();
    assert_eq!(ids, vec!["api", "usage", "usage-1", "private-api"]);
    assert_eq!(elements(&dom, "em").len(), 1);
}

proptest! {
    #[test]
    fn prop_fenced_code_text_round_trips(
        body in prop::collection::vec("[ -_a-~]{1,30}", 1..6),
    ) {
        let markdown = format!("intro\n\n```\n{}\n```\n\noutro", body.join("\n"));
        let html = convert_for_test(&markdown);
        let dom = parse(&html);

        let code = elements(&dom, "code");
        prop_assert_eq!(code.len(), 1);
        prop_assert_eq!(text_content(&code[0]), body.join("\n"));
    }

    #[test]
    fn prop_nested_list_depth_matches_indentation(
        depths in prop::collection::vec(0usize..5, 1..15),
    ) {
        // Each line deepens by at most one level
        let mut level = 0usize;
        let mut expected = Vec::new();
        let mut lines = Vec::new();
        for (n, depth) in depths.iter().enumerate() {
            level = (*depth).min(level + 1);
            lines.push(format!("{}- item{}", "  ".repeat(level), n));
            expected.push((format!("item{}", n), level + 1));
        }

        let dom = parse(&convert_for_test(&lines.join("\n")));
        let mut items = Vec::new();
        list_items_with_depth(&dom.document, 0, &mut items);
        prop_assert_eq!(items, expected);
    }
}
