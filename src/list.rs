//! List conversion with indentation-based nesting
//!
//! A list is one maximal run of consecutive marker lines of a single class:
//! unordered (`-`, `*`, `+`) or ordered (`1.`). A line of the other class
//! ends the run and starts a new, independent list.
//!
//! Nesting is rebuilt from indentation. The run is flattened into an arena of
//! items, each with its indent relative to the shallowest item of the run.
//! Every item owns the contiguous range of following items that are indented
//! strictly deeper than itself; those become its nested sub-list. Ranges are
//! computed in one stack pass, and rendering recurses over them, so the whole
//! conversion is linear in the number of items.
//!
//! ```markdown
//! - fruit
//!   - apple
//!     - green
//!   - pear
//! - bread
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::block::Segment;
use crate::pattern::cached_regex;
use crate::source::indent_width;

/// Marker class of a list run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `-`, `*` or `+`
    Unordered,
    /// `N.`
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// One list line: relative indent, item number for ordered lists, content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Leading whitespace width minus the run's minimum
    pub indent: usize,
    /// Number written in the marker (ordered lists only)
    pub number: Option<u64>,
    /// Text after the marker
    pub content: String,
}

fn unordered_regex() -> Option<&'static Regex> {
    static UNORDERED: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&UNORDERED, r"^([ \t]*)[-*+][ \t]+(.*)$")
}

fn ordered_regex() -> Option<&'static Regex> {
    static ORDERED: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&ORDERED, r"^([ \t]*)([0-9]{1,9})\.[ \t]+(.*)$")
}

/// Classify a line as a list marker line
///
/// Returns the marker class, absolute indent width, item number and content.
fn parse_marker(line: &str) -> Option<(ListKind, usize, Option<u64>, String)> {
    if let Some(caps) = unordered_regex().and_then(|re| re.captures(line)) {
        return Some((
            ListKind::Unordered,
            indent_width(&caps[1]),
            None,
            caps[2].trim_end().to_string(),
        ));
    }
    if let Some(caps) = ordered_regex().and_then(|re| re.captures(line)) {
        return Some((
            ListKind::Ordered,
            indent_width(&caps[1]),
            caps[2].parse().ok(),
            caps[3].trim_end().to_string(),
        ));
    }
    None
}

/// For each item, the index one past its subtree
///
/// An item's subtree is the run of following items indented strictly deeper
/// than it.
fn subtree_ends(items: &[ListItem]) -> Vec<usize> {
    let mut ends = vec![items.len(); items.len()];
    let mut open: Vec<usize> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        while let Some(&top) = open.last() {
            if items[top].indent < item.indent {
                break;
            }
            ends[top] = i;
            open.pop();
        }
        open.push(i);
    }
    ends
}

/// A flattened list run ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRun {
    /// Marker class shared by every item
    pub kind: ListKind,
    /// Items in document order
    pub items: Vec<ListItem>,
}

impl ListRun {
    /// Render the run as nested `<ul>`/`<ol>` elements
    pub fn to_html(&self) -> String {
        let ends = subtree_ends(&self.items);
        let mut output = String::with_capacity(32 * self.items.len());
        self.render_range(0, self.items.len(), &ends, &mut output);
        output.truncate(output.trim_end().len());
        output
    }

    fn render_range(&self, lo: usize, hi: usize, ends: &[usize], output: &mut String) {
        let tag = self.kind.tag();
        output.push('<');
        output.push_str(tag);
        if let Some(start) = self.items[lo].number.filter(|n| *n != 1) {
            output.push_str(&format!(" start=\"{}\"", start));
        }
        output.push_str(">\n");

        let mut i = lo;
        while i < hi {
            output.push_str("<li>");
            output.push_str(&self.items[i].content);
            if ends[i] > i + 1 {
                output.push('\n');
                self.render_range(i + 1, ends[i], ends, output);
            }
            output.push_str("</li>\n");
            i = ends[i];
        }

        output.push_str("</");
        output.push_str(tag);
        output.push_str(">\n");
    }
}

/// Convert every list run in the document into a rendered list block
pub fn convert_lists(segments: Vec<Segment>) -> Vec<Segment> {
    let mut output = Vec::with_capacity(segments.len());
    let mut converted = 0usize;
    let mut i = 0;

    while i < segments.len() {
        let Some((kind, indent, number, content)) = segments[i].as_text().and_then(parse_marker)
        else {
            output.push(segments[i].clone());
            i += 1;
            continue;
        };

        let mut raw = vec![(indent, number, content)];
        let mut end = i + 1;
        while let Some((next_kind, indent, number, content)) =
            segments.get(end).and_then(Segment::as_text).and_then(parse_marker)
        {
            if next_kind != kind {
                break;
            }
            raw.push((indent, number, content));
            end += 1;
        }

        let min_indent = raw.iter().map(|(indent, _, _)| *indent).min().unwrap_or(0);
        let items = raw
            .into_iter()
            .map(|(indent, number, content)| ListItem {
                indent: indent - min_indent,
                number,
                content,
            })
            .collect::<Vec<_>>();
        log::trace!("{:?} list at segment {} with {} items", kind, i, items.len());

        output.push(Segment::Block(ListRun { kind, items }.to_html()));
        converted += 1;
        i = end;
    }

    if converted > 0 {
        log::debug!("converted {} lists", converted);
    }
    output
}
