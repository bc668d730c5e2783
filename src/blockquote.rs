//! Blockquote expansion
//!
//! A blockquote is a maximal run of lines starting with `>` (up to three
//! spaces of indentation allowed). A bare `>` is a blank line inside the
//! quote. One level of prefix is stripped, `>` plus one optional space, and
//! the interior is converted as a small document of its own: tables,
//! paragraph grouping, then emphasis and links. The result is one sealed
//! `<blockquote>` segment that no later pass touches.
//!
//! Only one level is expanded. A `>` left at the start of an interior line
//! after stripping stays literal text.

use std::sync::OnceLock;

use regex::Regex;

use crate::block::{Segment, from_lines};
use crate::inline::convert_inline;
use crate::paragraph::{group_paragraphs, join_blocks};
use crate::pattern::cached_regex;
use crate::table::convert_tables;

fn quote_regex() -> Option<&'static Regex> {
    static QUOTE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&QUOTE, r"^ {0,3}> ?(.*)$")
}

/// Interior text of a quote-prefixed line, or `None` for any other line
fn strip_quote_prefix(line: &str) -> Option<&str> {
    let caps = quote_regex()?.captures(line)?;
    caps.get(1).map(|m| m.as_str())
}

/// Render the interior lines of one blockquote
fn render_blockquote(interior: Vec<String>) -> String {
    let segments = from_lines(interior);
    let segments = convert_tables(segments);
    let segments = group_paragraphs(segments);
    let inner = join_blocks(convert_inline(segments, None));
    if inner.is_empty() {
        "<blockquote></blockquote>".to_string()
    } else {
        format!("<blockquote>\n{}\n</blockquote>", inner)
    }
}

/// Replace every run of quote-prefixed lines with a sealed `<blockquote>`
pub fn expand_blockquotes(segments: Vec<Segment>) -> Vec<Segment> {
    let mut output = Vec::with_capacity(segments.len());
    let mut interior: Vec<String> = Vec::new();
    let mut expanded = 0usize;

    for segment in segments {
        if let Some(inner) = segment.as_text().and_then(strip_quote_prefix) {
            interior.push(inner.to_string());
            continue;
        }
        if !interior.is_empty() {
            output.push(Segment::Sealed(render_blockquote(std::mem::take(&mut interior))));
            expanded += 1;
        }
        output.push(segment);
    }
    if !interior.is_empty() {
        output.push(Segment::Sealed(render_blockquote(interior)));
        expanded += 1;
    }

    if expanded > 0 {
        log::debug!("expanded {} blockquotes", expanded);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[&str]) -> Vec<Segment> {
        lines.iter().map(|l| Segment::Text(l.to_string())).collect()
    }

    fn sealed(segments: &[Segment]) -> Vec<&str> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Sealed(html) => Some(html.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_simple_quote() {
        let output = expand_blockquotes(text(&["> quoted", "> text"]));
        assert_eq!(
            sealed(&output),
            vec!["<blockquote>\n<p>quoted\ntext</p>\n</blockquote>"]
        );
    }

    #[test]
    fn test_bare_marker_separates_paragraphs() {
        let output = expand_blockquotes(text(&["> one", ">", "> two"]));
        assert_eq!(
            sealed(&output),
            vec!["<blockquote>\n<p>one</p>\n\n<p>two</p>\n</blockquote>"]
        );
    }

    #[test]
    fn test_quote_containing_table() {
        let output = expand_blockquotes(text(&[
            "> text",
            "> | A | B |",
            "> |---|---|",
            "> | 1 | 2 |",
        ]));
        let html = sealed(&output);
        assert_eq!(html.len(), 1);
        assert!(html[0].starts_with("<blockquote>\n<p>text</p>\n\n<table>"));
        assert!(html[0].contains("<td>1</td><td>2</td>"));
        assert!(html[0].ends_with("</table>\n</blockquote>"));
    }

    #[test]
    fn test_quote_interior_emphasis_and_links() {
        let output = expand_blockquotes(text(&["> **bold** [site](https://example.com)"]));
        assert_eq!(
            sealed(&output),
            vec![
                "<blockquote>\n<p><strong>bold</strong> <a href=\"https://example.com\">site</a></p>\n</blockquote>"
            ]
        );
    }

    #[test]
    fn test_quote_interior_keeps_list_and_header_syntax_literal() {
        let output = expand_blockquotes(text(&["> # not a header", "> - not a list"]));
        assert_eq!(
            sealed(&output),
            vec!["<blockquote>\n<p># not a header\n- not a list</p>\n</blockquote>"]
        );
    }

    #[test]
    fn test_non_quote_line_ends_run() {
        let output = expand_blockquotes(text(&["> a", "plain", "> b"]));
        assert_eq!(output.len(), 3);
        assert!(matches!(output[0], Segment::Sealed(_)));
        assert_eq!(output[1], Segment::Text("plain".into()));
        assert!(matches!(output[2], Segment::Sealed(_)));
    }

    #[test]
    fn test_prefix_without_space() {
        let output = expand_blockquotes(text(&[">tight"]));
        assert_eq!(
            sealed(&output),
            vec!["<blockquote>\n<p>tight</p>\n</blockquote>"]
        );
    }

    #[test]
    fn test_only_bare_markers() {
        let output = expand_blockquotes(text(&[">", ">"]));
        assert_eq!(sealed(&output), vec!["<blockquote></blockquote>"]);
    }

    #[test]
    fn test_indented_gt_is_not_a_quote() {
        let input = text(&["    > code-ish", "a > b"]);
        assert_eq!(expand_blockquotes(input.clone()), input);
    }
}
