//! Pipe table conversion
//!
//! A table is a header line containing at least one pipe, immediately
//! followed by a separator line, followed by any number of pipe-containing
//! body lines:
//!
//! ```markdown
//! | Name | Qty |
//! |:-----|----:|
//! | Tea  |   2 |
//! ```
//!
//! The separator decides everything: without a valid one directly beneath it,
//! a pipe-containing line is ordinary text and stays available to the
//! paragraph and inline passes.
//!
//! Alignment comes from the separator and is applied by column position.
//! Rows are rendered with exactly the cells they have; a ragged row is
//! neither padded nor truncated.

use crate::block::Segment;

/// Column alignment taken from a separator cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// No colon
    None,
    /// `:---`
    Left,
    /// `---:`
    Right,
    /// `:---:`
    Center,
}

impl Alignment {
    fn from_separator_cell(cell: &str) -> Self {
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) if cell.len() > 1 => Alignment::Center,
            (true, _) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        }
    }

    fn style_attribute(self) -> &'static str {
        match self {
            Alignment::None => "",
            Alignment::Left => " style=\"text-align: left\"",
            Alignment::Right => " style=\"text-align: right\"",
            Alignment::Center => " style=\"text-align: center\"",
        }
    }
}

/// Parsed table ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Header cells
    pub header: Vec<String>,
    /// One alignment per separator cell
    pub alignments: Vec<Alignment>,
    /// Body rows, each with its own cell count
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Render the table as HTML
    pub fn to_html(&self) -> String {
        let mut output = String::with_capacity(64 * (self.rows.len() + 1));
        output.push_str("<table>\n<thead>\n");
        self.write_row(&mut output, &self.header, "th");
        output.push_str("</thead>\n");
        if !self.rows.is_empty() {
            output.push_str("<tbody>\n");
            for row in &self.rows {
                self.write_row(&mut output, row, "td");
            }
            output.push_str("</tbody>\n");
        }
        output.push_str("</table>");
        output
    }

    fn write_row(&self, output: &mut String, cells: &[String], tag: &str) {
        output.push_str("<tr>");
        for (i, cell) in cells.iter().enumerate() {
            let style = self
                .alignments
                .get(i)
                .map_or("", |alignment| alignment.style_attribute());
            output.push('<');
            output.push_str(tag);
            output.push_str(style);
            output.push('>');
            output.push_str(cell);
            output.push_str("</");
            output.push_str(tag);
            output.push('>');
        }
        output.push_str("</tr>\n");
    }
}

/// Split a table line into trimmed cells
///
/// One leading and one trailing pipe are dropped before splitting.
///
/// # Examples
///
/// ```rust
/// use markdown_html_converter::table::split_cells;
///
/// assert_eq!(split_cells("| a | b |"), vec!["a", "b"]);
/// assert_eq!(split_cells("a|b"), vec!["a", "b"]);
/// assert_eq!(split_cells("| a || c"), vec!["a", "", "c"]);
/// ```
pub fn split_cells(line: &str) -> Vec<String> {
    let mut s = line.trim();
    if let Some(stripped) = s.strip_prefix('|') {
        s = stripped;
    }
    if let Some(stripped) = s.strip_suffix('|') {
        s = stripped;
    }
    s.split('|').map(|c| c.trim().to_string()).collect()
}

/// Parse a separator line into column alignments
///
/// Every non-empty cell must consist only of `-`, `:` and spaces and contain
/// at least one `-`. Returns `None` when the line is not a separator.
pub fn parse_separator(line: &str) -> Option<Vec<Alignment>> {
    let cells = split_cells(line);
    if cells.iter().all(|cell| cell.is_empty()) {
        return None;
    }

    let mut alignments = Vec::with_capacity(cells.len());
    for cell in &cells {
        if cell.is_empty() {
            alignments.push(Alignment::None);
            continue;
        }
        let valid = cell.chars().all(|c| matches!(c, '-' | ':' | ' ')) && cell.contains('-');
        if !valid {
            return None;
        }
        alignments.push(Alignment::from_separator_cell(cell));
    }
    Some(alignments)
}

/// Convert every pipe table in the document into a rendered `<table>` block
pub fn convert_tables(segments: Vec<Segment>) -> Vec<Segment> {
    let mut output = Vec::with_capacity(segments.len());
    let mut converted = 0usize;
    let mut i = 0;

    while i < segments.len() {
        let header_line = segments[i].as_text().filter(|line| line.contains('|'));
        let alignments = header_line.and_then(|_| {
            segments
                .get(i + 1)
                .and_then(Segment::as_text)
                .and_then(parse_separator)
        });

        let (Some(header_line), Some(alignments)) = (header_line, alignments) else {
            output.push(segments[i].clone());
            i += 1;
            continue;
        };

        let mut rows = Vec::new();
        let mut end = i + 2;
        while let Some(line) = segments.get(end).and_then(Segment::as_text) {
            if !line.contains('|') {
                break;
            }
            rows.push(split_cells(line));
            end += 1;
        }

        let table = Table {
            header: split_cells(header_line),
            alignments,
            rows,
        };
        log::trace!(
            "table at segment {}: {} columns, {} rows",
            i,
            table.alignments.len(),
            table.rows.len()
        );
        output.push(Segment::Block(table.to_html()));
        converted += 1;
        i = end;
    }

    if converted > 0 {
        log::debug!("converted {} tables", converted);
    }
    output
}
