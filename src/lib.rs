//! Markdown to HTML Converter
//!
//! This library converts a pragmatic markdown dialect into an HTML fragment.
//! It is a pure, synchronous, single-document text transducer: one document
//! in, one fragment out, no document assembly around it.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `converter`: the pass pipeline and its options
//! - `protect`: code span protection and placeholder restoration
//! - `blockquote`: quote run expansion
//! - `block`: document segments, headers and horizontal rules
//! - `table`: pipe tables with column alignment
//! - `list`: nested ordered and unordered lists
//! - `inline`: emphasis, links, images and checkboxes
//! - `paragraph`: paragraph assembly
//! - `source`: byte decoding and line splitting
//! - `ffi`: C-compatible interface
//!
//! # Examples
//!
//! ```rust
//! let html = markdown_html_converter::convert("**Hello**, world").expect("Conversion failed");
//! assert_eq!(html, "<p><strong>Hello</strong>, world</p>");
//! ```
//!
//! # Safety
//!
//! All FFI functions are marked `unsafe` and document their pointer
//! requirements. Memory allocated by Rust must be freed by Rust via the
//! provided cleanup functions.

pub mod block;
pub mod blockquote;
pub mod converter;
pub mod error;
pub mod ffi;
pub mod inline;
pub mod list;
pub mod paragraph;
mod pattern;
pub mod protect;
pub mod source;
pub mod table;

// Re-export main types for convenience
pub use block::HeadingEntry;
pub use converter::{Conversion, ConversionOptions, HtmlConverter};
pub use error::ConversionError;
pub use ffi::{MdHtmlOptions, MdHtmlResult};
pub use inline::CheckboxGlyphs;

/// Convert a markdown document to HTML with default options
///
/// # Errors
///
/// See [`HtmlConverter::convert`].
pub fn convert(markdown: &str) -> Result<String, ConversionError> {
    HtmlConverter::new().convert(markdown)
}
