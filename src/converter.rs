//! Markdown to HTML converter - runs the pass pipeline over one document
//!
//! This module wires the individual passes into the fixed conversion order
//! and owns the caller-facing configuration.
//!
//! # Pass Order
//!
//! 1. **Span protection**: fenced code, indented code and inline code are
//!    rendered and replaced by placeholder tokens
//! 2. **Blockquotes**: quote runs are expanded into sealed `<blockquote>`
//!    blocks
//! 3. **Block converters**: headers, tables, horizontal rules, lists
//! 4. **Paragraph assembly**: remaining text groups become `<p>` blocks,
//!    decided on source text
//! 5. **Inline converters**: emphasis, links and images, checkboxes
//! 6. **Span restoration**: placeholders are swapped back for code HTML
//!
//! Every pass consumes the previous pass's output and produces a new
//! sequence. No pass sees code content, and no block pass re-reads HTML that
//! an earlier block pass emitted.
//!
//! # Examples
//!
//! ```rust
//! use markdown_html_converter::converter::HtmlConverter;
//!
//! let converter = HtmlConverter::new();
//! let html = converter
//!     .convert("# Title\n\nSome *text* with `code`.")
//!     .expect("Conversion failed");
//! assert_eq!(
//!     html,
//!     "<h1>Title</h1>\n\n<p>Some <em>text</em> with <code>code</code>.</p>"
//! );
//! ```
//!
//! # Failure Model
//!
//! Malformed markdown is never an error. Each ambiguous construct falls back
//! to literal text. The only failures are undecodable input bytes and
//! placeholder invariant violations detected during restoration.

use crate::block::{self, HeadingEntry};
use crate::blockquote::expand_blockquotes;
use crate::error::ConversionError;
use crate::inline::{CheckboxGlyphs, convert_inline};
use crate::list::convert_lists;
use crate::paragraph::{group_paragraphs, join_blocks};
use crate::protect::{protect, restore};
use crate::source::{decode_markdown, split_lines};
use crate::table::convert_tables;

/// Conversion options
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Emit an `id` slug attribute on every header
    pub heading_ids: bool,
    /// Glyphs used for `[ ]` and `[x]` task checkboxes
    pub checkbox_glyphs: CheckboxGlyphs,
}

/// HTML fragment plus the document outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Rendered HTML fragment
    pub html: String,
    /// Headers in document order
    pub headings: Vec<HeadingEntry>,
}

/// Markdown to HTML converter
///
/// The converter holds only its options. Each call converts one document with
/// state local to that call, so a single converter can be shared across
/// threads and reused for any number of documents.
///
/// # Usage
///
/// ```rust
/// use markdown_html_converter::converter::{ConversionOptions, HtmlConverter};
///
/// let converter = HtmlConverter::with_options(ConversionOptions {
///     heading_ids: true,
///     ..Default::default()
/// });
///
/// let result = converter
///     .convert_with_outline("# Intro\n\n## Setup\n\n## Setup")
///     .expect("Conversion failed");
/// assert!(result.html.starts_with("<h1 id=\"intro\">Intro</h1>"));
/// assert_eq!(result.headings[2].slug, "setup-1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    options: ConversionOptions,
}

impl HtmlConverter {
    /// Create a new converter with default options
    ///
    /// Defaults: no header ids, `☐`/`☑` checkbox glyphs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new converter with custom options
    ///
    /// # Arguments
    ///
    /// * `options` - Conversion options
    pub fn with_options(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// Options this converter was built with
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert a markdown document to an HTML fragment
    ///
    /// # Arguments
    ///
    /// * `markdown` - Decoded markdown text; any line ending style
    ///
    /// # Returns
    ///
    /// Returns `Ok(String)` with the HTML fragment on success.
    ///
    /// # Errors
    ///
    /// - `ConversionError::UnknownPlaceholder` / `OrphanedPlaceholder`: the
    ///   input already contained text in placeholder token form, or a pass
    ///   lost a token
    pub fn convert(&self, markdown: &str) -> Result<String, ConversionError> {
        self.convert_with_outline(markdown)
            .map(|conversion| conversion.html)
    }

    /// Convert a markdown document and collect its headers
    ///
    /// # Errors
    ///
    /// Same as [`HtmlConverter::convert`].
    pub fn convert_with_outline(&self, markdown: &str) -> Result<Conversion, ConversionError> {
        let lines = split_lines(markdown);
        log::debug!("converting document of {} lines", lines.len());

        let protected = protect(&lines);
        let segments = block::from_lines(protected.lines);

        let segments = expand_blockquotes(segments);
        let (segments, headings) =
            block::convert_headers(segments, &protected.table, self.options.heading_ids);
        let segments = convert_tables(segments);
        let segments = block::convert_rules(segments);
        let segments = convert_lists(segments);
        let segments = group_paragraphs(segments);
        let segments = convert_inline(segments, Some(&self.options.checkbox_glyphs));

        let html = restore(&join_blocks(segments), &protected.table)?;

        log::debug!(
            "converted {} bytes of markdown into {} bytes of HTML ({} headers)",
            markdown.len(),
            html.len(),
            headings.len()
        );
        Ok(Conversion { html, headings })
    }

    /// Decode raw markdown bytes and convert them
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw document bytes
    /// * `charset` - Optional charset label; a byte order mark takes precedence
    ///
    /// # Errors
    ///
    /// - `ConversionError::EncodingError`: the bytes cannot be decoded
    /// - Any error of [`HtmlConverter::convert_with_outline`]
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        charset: Option<&str>,
    ) -> Result<Conversion, ConversionError> {
        let markdown = decode_markdown(bytes, charset)?;
        self.convert_with_outline(&markdown)
    }
}
