//! Document segments and the line-level block converters
//!
//! After span protection the document is a sequence of [`Segment`]s. Each
//! block converter walks that sequence once, claims the source lines it
//! recognises and replaces them with one rendered segment. Rendered segments
//! are opaque to every later block converter, so emitted HTML is never
//! re-scanned for markdown structure.
//!
//! This module holds the two single-line converters: ATX headers and
//! horizontal rules. Tables and lists live in their own modules.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::pattern::cached_regex;
use crate::protect::{PLACEHOLDER_OPEN, PlaceholderTable, SpanKind, escape_html, placeholder_token};

/// One element of the document under conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A source line no block converter has claimed yet
    Text(String),
    /// Rendered block HTML whose text content still needs the inline passes
    Block(String),
    /// Rendered block HTML that is final apart from placeholder restoration
    Sealed(String),
}

impl Segment {
    /// The source line, if this segment is still unclaimed text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text(line) => Some(line),
            _ => None,
        }
    }
}

/// Lift a line sequence into unclaimed text segments
pub fn from_lines(lines: Vec<String>) -> Vec<Segment> {
    lines.into_iter().map(Segment::Text).collect()
}

/// A header found by the header converter
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct HeadingEntry {
    /// Header level, 1 to 6
    pub level: u8,
    /// Header text with markup removed
    pub text: String,
    /// Anchor slug, unique within the document
    pub slug: String,
}

fn header_regex() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&HEADER, r"^ {0,3}(#{1,6})(?:[ \t]+(.*))?$")
}

fn link_text_regex() -> Option<&'static Regex> {
    static LINK_TEXT: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&LINK_TEXT, r"!?\[([^\]]*)\]\([^)]*\)")
}

fn tag_regex() -> Option<&'static Regex> {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&TAG, r"<[^>]*>")
}

/// Strip an optional closing run of `#` from header content
fn strip_closing_hashes(content: &str) -> &str {
    let trimmed = content.trim_end();
    let without = trimmed.trim_end_matches('#');
    if without.is_empty() {
        return without;
    }
    if without.len() < trimmed.len() && without.ends_with([' ', '\t']) {
        return without.trim_end();
    }
    trimmed
}

/// Generates unique anchor slugs for the headers of one document
#[derive(Debug, Default)]
pub struct SlugGenerator {
    seen: HashMap<String, usize>,
}

impl SlugGenerator {
    /// Create a generator with no slugs issued yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `text`, suffixed with `-1`, `-2`, ... on repeats
    ///
    /// # Examples
    ///
    /// ```rust
    /// use markdown_html_converter::block::SlugGenerator;
    ///
    /// let mut slugs = SlugGenerator::new();
    /// assert_eq!(slugs.slug("Getting Started!"), "getting-started");
    /// assert_eq!(slugs.slug("Getting Started"), "getting-started-1");
    /// ```
    pub fn slug(&mut self, text: &str) -> String {
        let base: String = text
            .trim()
            .to_lowercase()
            .chars()
            .filter_map(|c| match c {
                ' ' => Some('-'),
                '-' | '_' => Some(c),
                c if c.is_alphanumeric() => Some(c),
                _ => None,
            })
            .collect();

        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        slug
    }
}

/// Plain text of header content, for the outline and slugs
///
/// Link syntax keeps only its text, emphasis markers are dropped,
/// placeholders are resolved through `table`, tags are removed and the five
/// escapes undone.
fn plain_text(content: &str, table: &PlaceholderTable) -> String {
    let mut text = match link_text_regex() {
        Some(regex) => regex.replace_all(content, "$1").into_owned(),
        None => content.to_string(),
    };
    text = crate::inline::convert_emphasis(&text);
    if text.contains(PLACEHOLDER_OPEN) {
        for index in 0..table.len() {
            let inline = placeholder_token(SpanKind::Inline, index);
            if text.contains(&inline)
                && let Some(html) = table.get(index)
            {
                text = text.replace(&inline, html);
            }
        }
    }
    if let Some(regex) = tag_regex() {
        text = regex.replace_all(&text, "").into_owned();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Convert ATX header lines (`#` to `######`) into `<h1>`..`<h6>`
///
/// Returns the new segment sequence and the headers in document order. When
/// `heading_ids` is set, each header carries its slug as an `id` attribute.
pub fn convert_headers(
    segments: Vec<Segment>,
    table: &PlaceholderTable,
    heading_ids: bool,
) -> (Vec<Segment>, Vec<HeadingEntry>) {
    let Some(regex) = header_regex() else {
        return (segments, Vec::new());
    };

    let mut slugs = SlugGenerator::new();
    let mut headings = Vec::new();
    let output = segments
        .into_iter()
        .map(|segment| {
            let Some(caps) = segment.as_text().and_then(|line| regex.captures(line)) else {
                return segment;
            };
            let level = caps[1].len() as u8;
            let content = strip_closing_hashes(caps.get(2).map_or("", |m| m.as_str()));
            let text = plain_text(content, table);
            let slug = slugs.slug(&text);
            log::trace!("header level {}: {:?}", level, text);

            let html = if heading_ids {
                format!(
                    "<h{level} id=\"{}\">{content}</h{level}>",
                    escape_html(&slug)
                )
            } else {
                format!("<h{level}>{content}</h{level}>")
            };
            headings.push(HeadingEntry { level, text, slug });
            Segment::Block(html)
        })
        .collect();

    (output, headings)
}

/// Whether a line is a thematic break: three or more of one of `-`, `*`,
/// `_`, optionally separated by spaces, and nothing else
pub fn is_horizontal_rule(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(marker) = trimmed.chars().next() else {
        return false;
    };
    if !matches!(marker, '-' | '*' | '_') {
        return false;
    }
    let mut count = 0;
    for ch in trimmed.chars() {
        if ch == marker {
            count += 1;
        } else if ch != ' ' && ch != '\t' {
            return false;
        }
    }
    count >= 3
}

/// Convert horizontal rule lines into `<hr>`
pub fn convert_rules(segments: Vec<Segment>) -> Vec<Segment> {
    segments
        .into_iter()
        .map(|segment| match segment.as_text() {
            Some(line) if is_horizontal_rule(line) => Segment::Sealed("<hr>".to_string()),
            _ => segment,
        })
        .collect()
}
