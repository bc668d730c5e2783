//! Paragraph assembly
//!
//! Unclaimed text lines are grouped into blocks separated by blank lines or
//! by rendered segments. Each group is wrapped in `<p>` unless its source
//! already reads as block-level content. The decision is made on the source
//! text, before the inline converters run, so a paragraph opening with
//! `**bold**` or an image is still a paragraph.
//!
//! Once the inline passes are done, [`join_blocks`] lays the blocks out with
//! one blank line between them.

use crate::block::Segment;
use crate::protect::starts_with_block_placeholder;
use crate::source::is_blank;

/// Separator placed between output blocks
const BLOCK_SEPARATOR: &str = "\n\n";

/// Whether a text block passes through without a `<p>` wrapper
///
/// A block is left alone when it starts with `<` (HTML written in the
/// source), with a code block placeholder, or with `|` (a pipe line that did
/// not become a table).
pub fn is_block_level(block: &str) -> bool {
    let block = block.trim_start();
    // Inline code tokens are wrapped: a sentence led by `code` is still prose
    block.starts_with('<') || block.starts_with('|') || starts_with_block_placeholder(block)
}

fn flush(group: &mut Vec<String>, output: &mut Vec<Segment>) {
    if group.is_empty() {
        return;
    }
    let html = if is_block_level(&group[0]) {
        group.join("\n")
    } else {
        let lines: Vec<&str> = group.iter().map(|line| line.trim()).collect();
        format!("<p>{}</p>", lines.join("\n"))
    };
    output.push(Segment::Block(html));
    group.clear();
}

/// Turn every group of unclaimed text lines into one block segment
///
/// Blank lines are consumed. Rendered segments pass through unchanged and
/// end the group before them.
pub fn group_paragraphs(segments: Vec<Segment>) -> Vec<Segment> {
    let mut output = Vec::with_capacity(segments.len());
    let mut group: Vec<String> = Vec::new();
    let mut paragraphs = 0usize;

    for segment in segments {
        match segment {
            Segment::Text(line) if is_blank(&line) => {
                paragraphs += usize::from(!group.is_empty());
                flush(&mut group, &mut output);
            }
            Segment::Text(line) => group.push(line),
            rendered => {
                paragraphs += usize::from(!group.is_empty());
                flush(&mut group, &mut output);
                output.push(rendered);
            }
        }
    }
    paragraphs += usize::from(!group.is_empty());
    flush(&mut group, &mut output);

    log::debug!("grouped {} text blocks", paragraphs);
    output
}

/// Lay out the final blocks as one HTML string
///
/// # Examples
///
/// ```rust
/// use markdown_html_converter::block::Segment;
/// use markdown_html_converter::paragraph::{group_paragraphs, join_blocks};
///
/// let segments = vec![
///     Segment::Block("<h1>Title</h1>".to_string()),
///     Segment::Text("first line".to_string()),
///     Segment::Text("second line".to_string()),
///     Segment::Text(String::new()),
///     Segment::Text("<div>raw</div>".to_string()),
/// ];
/// assert_eq!(
///     join_blocks(group_paragraphs(segments)),
///     "<h1>Title</h1>\n\n<p>first line\nsecond line</p>\n\n<div>raw</div>"
/// );
/// ```
pub fn join_blocks(segments: Vec<Segment>) -> String {
    let blocks: Vec<String> = segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(line) if is_blank(&line) => None,
            Segment::Text(html) | Segment::Block(html) | Segment::Sealed(html) => Some(html),
        })
        .collect();
    blocks.join(BLOCK_SEPARATOR)
}
