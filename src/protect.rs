//! Span protection and restoration
//!
//! Code is the one kind of content whose bytes must survive conversion
//! untouched. Before any other pass runs, every fenced block, indented block
//! and inline code span is rendered to its final HTML, stored in a
//! [`PlaceholderTable`], and replaced in the text by an opaque token. After
//! every other pass has run, [`restore`] swaps the tokens back.
//!
//! # Token format
//!
//! ```text
//! U+E000  kind  index  U+E001
//! ```
//!
//! `kind` is `B` for block code and `I` for inline code; `index` is the
//! decimal position in the table. The delimiters are Unicode private-use code
//! points, which no markdown or HTML syntax uses and which the inline and
//! block converters never match. Input that already contains this exact
//! pattern outside code collides with the engine's own tokens; this is the
//! one known collision risk of the format.
//!
//! # Escaping
//!
//! Protected content has exactly five characters escaped: `&`, `<`, `>`, `"`
//! and `'`. Nothing else is touched.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::ConversionError;
use crate::pattern::cached_regex;
use crate::source::is_blank;

/// Opening delimiter of a placeholder token
pub const PLACEHOLDER_OPEN: char = '\u{E000}';

/// Closing delimiter of a placeholder token
pub const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Kind of protected span a placeholder stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Fenced or indented code block, always alone on its line
    Block,
    /// Inline code span, embedded in running text
    Inline,
}

impl SpanKind {
    fn marker(self) -> char {
        match self {
            SpanKind::Block => 'B',
            SpanKind::Inline => 'I',
        }
    }
}

/// Rendered HTML for every protected span of one conversion call
///
/// Indices are dense, zero-based and never reused. The table is filled by
/// [`protect`] and only read afterwards.
#[derive(Debug, Default)]
pub struct PlaceholderTable {
    entries: Vec<(SpanKind, String)>,
}

impl PlaceholderTable {
    /// Store rendered HTML and return the token that stands in for it
    fn register(&mut self, kind: SpanKind, html: String) -> String {
        let index = self.entries.len();
        self.entries.push((kind, html));
        placeholder_token(kind, index)
    }

    /// Number of registered spans
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no span was protected
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered HTML registered at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(_, html)| html.as_str())
    }
}

/// Result of the protection pass
#[derive(Debug)]
pub struct Protected {
    /// Document lines with every code span replaced by its token
    pub lines: Vec<String>,
    /// Rendered HTML for each token
    pub table: PlaceholderTable,
}

/// Build the token text for a placeholder
pub fn placeholder_token(kind: SpanKind, index: usize) -> String {
    format!(
        "{}{}{}{}",
        PLACEHOLDER_OPEN,
        kind.marker(),
        index,
        PLACEHOLDER_CLOSE
    )
}

/// Whether `text` begins with a block code placeholder
pub fn starts_with_block_placeholder(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(PLACEHOLDER_OPEN) && chars.next() == Some(SpanKind::Block.marker())
}

/// Escape the five HTML-special characters
///
/// # Examples
///
/// ```rust
/// use markdown_html_converter::protect::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">'&'</a>"#),
///     "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(ch),
        }
    }
    output
}

fn fence_open_regex() -> Option<&'static Regex> {
    static FENCE_OPEN: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&FENCE_OPEN, r"^\s*(`{3,})[ \t]*([^`\s]+)?[ \t]*$")
}

fn fence_close_regex() -> Option<&'static Regex> {
    static FENCE_CLOSE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&FENCE_CLOSE, r"^\s*(`{3,})\s*$")
}

fn inline_code_regex() -> Option<&'static Regex> {
    static INLINE_CODE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&INLINE_CODE, r"`([^`]+)`")
}

fn placeholder_regex() -> Option<&'static Regex> {
    static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&PLACEHOLDER, "\u{E000}([BI])([0-9]+)\u{E001}")
}

/// Replace every code span in the document by a placeholder token
///
/// Block code is handled before inline code so that the backticks of a fence
/// line are never read as an inline span.
///
/// # Examples
///
/// ```rust
/// use markdown_html_converter::protect::protect;
///
/// let lines: Vec<String> = ["```rust", "let x = 1 < 2;", "```"]
///     .iter().map(|s| s.to_string()).collect();
/// let protected = protect(&lines);
/// assert_eq!(protected.table.len(), 1);
/// assert_eq!(
///     protected.table.get(0),
///     Some("<pre><code class=\"language-rust\">let x = 1 &lt; 2;</code></pre>")
/// );
/// ```
pub fn protect(lines: &[String]) -> Protected {
    let mut table = PlaceholderTable::default();
    let lines = protect_fenced(lines, &mut table);
    let lines = pad_block_tokens(protect_indented(&lines, &mut table));
    let block_count = table.len();
    let lines = protect_inline(&lines, &mut table);
    log::debug!(
        "protected {} code blocks and {} inline spans",
        block_count,
        table.len() - block_count
    );
    Protected { lines, table }
}

/// Fence every block placeholder off with blank lines
///
/// Runs after all block detection, so the padding is never mistaken for a
/// blank line the author wrote.
fn pad_block_tokens(lines: Vec<String>) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len());
    for line in lines {
        if starts_with_block_placeholder(&line) {
            output.push(String::new());
            output.push(line);
            output.push(String::new());
        } else {
            output.push(line);
        }
    }
    output
}

fn render_code_block(body: &str, language: Option<&str>) -> String {
    match language {
        Some(language) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_html(language),
            escape_html(body)
        ),
        None => format!("<pre><code>{}</code></pre>", escape_html(body)),
    }
}

/// Fenced code blocks
///
/// A fence without a closing line runs to the end of the document.
fn protect_fenced(lines: &[String], table: &mut PlaceholderTable) -> Vec<String> {
    let (Some(open_regex), Some(close_regex)) = (fence_open_regex(), fence_close_regex()) else {
        return lines.to_vec();
    };
    let mut output = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = open_regex.captures(&lines[i]) else {
            output.push(lines[i].clone());
            i += 1;
            continue;
        };

        let fence_len = caps[1].len();
        let language = caps.get(2).map(|m| m.as_str());
        let body_start = i + 1;
        let mut end = body_start;
        while end < lines.len() {
            let closes = close_regex
                .captures(&lines[end])
                .is_some_and(|close| close[1].len() >= fence_len);
            if closes {
                break;
            }
            end += 1;
        }

        if end == lines.len() {
            log::trace!("unterminated fence at line {} runs to end of document", i + 1);
        }

        let body = lines[body_start..end].join("\n");
        let token = table.register(SpanKind::Block, render_code_block(&body, language));
        output.push(token);

        // Skip the closing fence if there was one
        i = end + 1;
    }

    output
}

fn is_indented_code_line(line: &str) -> bool {
    (line.starts_with('\t') || line.starts_with("    ")) && !is_blank(line)
}

fn strip_one_indent(line: &str) -> &str {
    line.strip_prefix('\t')
        .or_else(|| line.strip_prefix("    "))
        .unwrap_or_else(|| line.trim_start())
}

/// Indented code blocks
///
/// The block must follow a blank line or the start of the document. A bare
/// `>` line is quote content, not a blank line, so indentation right after
/// a quote never opens a code block. Blank lines may sit inside the block;
/// trailing ones go back to the document.
fn protect_indented(lines: &[String], table: &mut PlaceholderTable) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let after_blank = i == 0 || is_blank(&lines[i - 1]);
        if !(after_blank && is_indented_code_line(&lines[i])) {
            output.push(lines[i].clone());
            i += 1;
            continue;
        }

        let mut end = i;
        while end < lines.len() && (is_indented_code_line(&lines[end]) || is_blank(&lines[end])) {
            end += 1;
        }
        while end > i && is_blank(&lines[end - 1]) {
            end -= 1;
        }

        let body = lines[i..end]
            .iter()
            .map(|line| strip_one_indent(line))
            .collect::<Vec<_>>()
            .join("\n");
        let token = table.register(SpanKind::Block, render_code_block(&body, None));
        output.push(token);
        i = end;
    }

    output
}

/// Inline code spans, one backtick on each side, never crossing a line
fn protect_inline(lines: &[String], table: &mut PlaceholderTable) -> Vec<String> {
    let Some(regex) = inline_code_regex() else {
        return lines.to_vec();
    };
    lines
        .iter()
        .map(|line| {
            if !line.contains('`') {
                return line.clone();
            }
            regex
                .replace_all(line, |caps: &Captures| {
                    let html = format!("<code>{}</code>", escape_html(&caps[1]));
                    table.register(SpanKind::Inline, html)
                })
                .into_owned()
        })
        .collect()
}

/// Substitute every placeholder token with its protected HTML
///
/// This is the last step of a conversion. Inserted HTML is never re-scanned.
///
/// # Errors
///
/// - `ConversionError::UnknownPlaceholder`: a token names an index the table
///   does not hold, or holds with a different kind
/// - `ConversionError::OrphanedPlaceholder`: a registered span never appears
///   in the text
///
/// Both mean an earlier pass mishandled a token.
pub fn restore(text: &str, table: &PlaceholderTable) -> Result<String, ConversionError> {
    if table.is_empty() && !text.contains(PLACEHOLDER_OPEN) {
        return Ok(text.to_string());
    }

    let Some(regex) = placeholder_regex() else {
        return Err(ConversionError::InternalError(
            "placeholder pattern unavailable".to_string(),
        ));
    };

    let mut restored = vec![false; table.len()];
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Ok(index) = caps[2].parse::<usize>() else {
            log::error!("placeholder index {} is out of range", &caps[2]);
            return Err(ConversionError::UnknownPlaceholder(usize::MAX));
        };
        let kind = if &caps[1] == "B" {
            SpanKind::Block
        } else {
            SpanKind::Inline
        };

        let html = match table.entries.get(index) {
            Some((registered, html)) if *registered == kind => html,
            _ => {
                log::error!("placeholder {} was never registered", index);
                return Err(ConversionError::UnknownPlaceholder(index));
            }
        };

        output.push_str(&text[last..whole.start()]);
        output.push_str(html);
        restored[index] = true;
        last = whole.end();
    }
    output.push_str(&text[last..]);

    if let Some(index) = restored.iter().position(|done| !done) {
        log::error!("placeholder {} was dropped before restoration", index);
        return Err(ConversionError::OrphanedPlaceholder(index));
    }

    Ok(output)
}
