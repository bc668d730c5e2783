//! Inline converters: emphasis, links and images, task checkboxes
//!
//! The inline passes run on every segment that still carries source text:
//! unclaimed lines and rendered blocks such as table cells, list items and
//! headers. Sealed blocks are skipped. Only the text between HTML tags is
//! rewritten, so attribute values (header ids, alignment styles, raw HTML in
//! the source) are never mistaken for markup.
//!
//! Passes apply in a fixed order within each text run:
//!
//! 1. Images `![alt](src)`, then links `[text](href)`
//! 2. Emphasis, longest marker first: `***`/`___`, then `**`/`__`, then `*`/`_`
//! 3. Checkboxes `[ ]`, `[x]` and `[X]`
//!
//! Links go first so that the URL ends up inside a tag before emphasis runs;
//! `_a_` in a path is then out of reach. Emphasis cannot span a link
//! boundary. Targets, titles and alt text never take a code placeholder, so
//! restored `<code>` markup cannot land inside an attribute.
//!
//! Unmatched markers stay literal.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::block::Segment;
use crate::pattern::cached_regex;

/// Glyphs substituted for task checkboxes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxGlyphs {
    /// Replacement for `[ ]`
    pub unchecked: String,
    /// Replacement for `[x]` and `[X]`
    pub checked: String,
}

impl Default for CheckboxGlyphs {
    fn default() -> Self {
        Self {
            unchecked: "\u{2610}".to_string(),
            checked: "\u{2611}".to_string(),
        }
    }
}

fn tag_regex() -> Option<&'static Regex> {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&TAG, r"</?[A-Za-z!][^<>]*>")
}

fn image_regex() -> Option<&'static Regex> {
    static IMAGE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &IMAGE,
        r#"!\[([^\]\x{E000}]*)\]\(([^()\s\x{E000}]+)(?:[ \t]+"([^"\x{E000}]*)")?\)"#,
    )
}

fn link_regex() -> Option<&'static Regex> {
    static LINK: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &LINK,
        r#"\[([^\]]+)\]\(([^()\s\x{E000}]+)(?:[ \t]+"([^"\x{E000}]*)")?\)"#,
    )
}

fn checkbox_regex() -> Option<&'static Regex> {
    static CHECKBOX: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&CHECKBOX, r"\[([ xX])\]")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Apply `f` to the text between HTML tags, copying tags unchanged
fn map_text_runs(text: &str, f: impl Fn(&str) -> String) -> String {
    let Some(regex) = tag_regex() else {
        return f(text);
    };
    let mut output = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for tag in regex.find_iter(text) {
        output.push_str(&f(&text[last..tag.start()]));
        output.push_str(tag.as_str());
        last = tag.end();
    }
    output.push_str(&f(&text[last..]));
    output
}

/// Replace `marker content marker` pairs with `open content close`
///
/// Content must not begin or end with whitespace or with the marker
/// character. Underscore markers must also sit on word boundaries, so
/// `snake_case_name` is left alone. The first valid closer wins.
fn replace_delimited(text: &str, marker: &str, open: &str, close: &str) -> String {
    if !text.contains(marker) {
        return text.to_string();
    }
    let marker_char = if marker.starts_with('_') { '_' } else { '*' };
    let underscore = marker_char == '_';

    let char_before = |at: usize| text[..at].chars().next_back();
    let char_after = |at: usize| text[at..].chars().next();

    let mut output = String::with_capacity(text.len() + 16);
    let mut copied = 0;
    let mut search = 0;

    while let Some(offset) = text[search..].find(marker) {
        let start = search + offset;
        let content_start = start + marker.len();

        let first = char_after(content_start)
            .filter(|c| !c.is_whitespace() && *c != marker_char)
            .filter(|_| !(underscore && char_before(start).is_some_and(is_word_char)));
        let Some(first) = first else {
            search = start + 1;
            continue;
        };

        let mut closer = None;
        let mut probe = content_start + first.len_utf8();
        while let Some(found) = text.get(probe..).and_then(|rest| rest.find(marker)) {
            let at = probe + found;
            let end = at + marker.len();
            let inner_ok = char_before(at).is_some_and(|c| !c.is_whitespace() && c != marker_char);
            let outer_ok = match char_after(end) {
                Some(c) => c != marker_char && !(underscore && is_word_char(c)),
                None => true,
            };
            if inner_ok && outer_ok {
                closer = Some(at);
                break;
            }
            probe = at + 1;
        }

        match closer {
            Some(at) => {
                output.push_str(&text[copied..start]);
                output.push_str(open);
                output.push_str(&text[content_start..at]);
                output.push_str(close);
                copied = at + marker.len();
                search = copied;
            }
            None => search = start + 1,
        }
    }

    output.push_str(&text[copied..]);
    output
}

/// Convert emphasis markers to `<strong>`/`<em>`
///
/// # Examples
///
/// ```rust
/// use markdown_html_converter::inline::convert_emphasis;
///
/// assert_eq!(
///     convert_emphasis("***both*** **bold** *it* __b__ _i_"),
///     "<strong><em>both</em></strong> <strong>bold</strong> <em>it</em> \
///      <strong>b</strong> <em>i</em>"
/// );
/// assert_eq!(convert_emphasis("a * b * c"), "a * b * c");
/// ```
pub fn convert_emphasis(text: &str) -> String {
    let text = replace_delimited(text, "***", "<strong><em>", "</em></strong>");
    let text = replace_delimited(&text, "___", "<strong><em>", "</em></strong>");
    let text = replace_delimited(&text, "**", "<strong>", "</strong>");
    let text = replace_delimited(&text, "__", "<strong>", "</strong>");
    let text = replace_delimited(&text, "*", "<em>", "</em>");
    replace_delimited(&text, "_", "<em>", "</em>")
}

/// Escape a value for a double-quoted attribute
///
/// `&` is left alone so entities already written in a URL survive.
fn attribute_value(value: &str) -> String {
    value
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn title_attribute(caps: &Captures<'_>) -> String {
    caps.get(3)
        .map(|title| format!(" title=\"{}\"", attribute_value(title.as_str())))
        .unwrap_or_default()
}

/// Convert images and links to `<img>` and `<a>`
///
/// An optional double-quoted title after the target becomes a `title`
/// attribute.
pub fn convert_links(text: &str) -> String {
    if !text.contains("](") {
        return text.to_string();
    }
    let mut output = text.to_string();
    if let Some(regex) = image_regex() {
        output = regex
            .replace_all(&output, |caps: &Captures<'_>| {
                format!(
                    "<img src=\"{}\" alt=\"{}\"{}>",
                    attribute_value(&caps[2]),
                    attribute_value(&caps[1]),
                    title_attribute(caps)
                )
            })
            .into_owned();
    }
    if let Some(regex) = link_regex() {
        output = regex
            .replace_all(&output, |caps: &Captures<'_>| {
                format!(
                    "<a href=\"{}\"{}>{}</a>",
                    attribute_value(&caps[2]),
                    title_attribute(caps),
                    &caps[1]
                )
            })
            .into_owned();
    }
    output
}

/// Replace task checkboxes with glyphs
///
/// A bracket pair directly after a word character, as in `items[x]`, is
/// indexing and stays literal.
pub fn convert_checkboxes(text: &str, glyphs: &CheckboxGlyphs) -> String {
    let Some(regex) = checkbox_regex() else {
        return text.to_string();
    };
    regex
        .replace_all(text, |caps: &Captures<'_>| {
            let start = caps.get(0).map_or(0, |m| m.start());
            if text[..start].chars().next_back().is_some_and(is_word_char) {
                return caps[0].to_string();
            }
            if &caps[1] == " " {
                glyphs.unchecked.clone()
            } else {
                glyphs.checked.clone()
            }
        })
        .into_owned()
}

/// Run every inline converter over one piece of text
///
/// Checkboxes are converted only when `glyphs` is given.
pub fn convert_text(text: &str, glyphs: Option<&CheckboxGlyphs>) -> String {
    let linked = map_text_runs(text, convert_links);
    map_text_runs(&linked, |run| {
        if run.is_empty() {
            return String::new();
        }
        let run = convert_emphasis(run);
        match glyphs {
            Some(glyphs) => convert_checkboxes(&run, glyphs),
            None => run,
        }
    })
}

/// Apply the inline converters to every segment that is not sealed
pub fn convert_inline(segments: Vec<Segment>, glyphs: Option<&CheckboxGlyphs>) -> Vec<Segment> {
    segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(line) => Segment::Text(convert_text(&line, glyphs)),
            Segment::Block(html) => Segment::Block(convert_text(&html, glyphs)),
            sealed @ Segment::Sealed(_) => sealed,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_emphasis_levels() {
        assert_eq!(convert_emphasis("*a*"), "<em>a</em>");
        assert_eq!(convert_emphasis("**a**"), "<strong>a</strong>");
        assert_eq!(convert_emphasis("***a***"), "<strong><em>a</em></strong>");
        assert_eq!(convert_emphasis("___a___"), "<strong><em>a</em></strong>");
    }

    #[test]
    fn test_emphasis_nested_inside_strong() {
        assert_eq!(
            convert_emphasis("**bold *and* more**"),
            "<strong>bold <em>and</em> more</strong>"
        );
    }

    #[test]
    fn test_multiple_spans_on_one_line() {
        assert_eq!(
            convert_emphasis("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
        assert_eq!(convert_emphasis("_a_ _b_"), "<em>a</em> <em>b</em>");
    }

    #[test]
    fn test_whitespace_edges_stay_literal() {
        assert_eq!(convert_emphasis("2 * 3 * 4"), "2 * 3 * 4");
        assert_eq!(convert_emphasis("** not bold **"), "** not bold **");
        assert_eq!(convert_emphasis("_ x _"), "_ x _");
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert_eq!(convert_emphasis("a *b"), "a *b");
        assert_eq!(convert_emphasis("**open"), "**open");
        assert_eq!(convert_emphasis("x_"), "x_");
    }

    #[test]
    fn test_underscore_requires_word_boundaries() {
        assert_eq!(convert_emphasis("snake_case_name"), "snake_case_name");
        assert_eq!(convert_emphasis("use _this_ one"), "use <em>this</em> one");
        assert_eq!(convert_emphasis("_a_b_"), "<em>a_b</em>");
        assert_eq!(convert_emphasis("__init__"), "<strong>init</strong>");
        assert_eq!(convert_emphasis("a__b__c"), "a__b__c");
    }

    #[test]
    fn test_star_inside_words() {
        assert_eq!(convert_emphasis("un*frigging*believable"), "un<em>frigging</em>believable");
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(
            convert_links("see [docs](https://example.com/a_b_c)"),
            "see <a href=\"https://example.com/a_b_c\">docs</a>"
        );
        assert_eq!(
            convert_links("![logo](img/logo.png)"),
            "<img src=\"img/logo.png\" alt=\"logo\">"
        );
        assert_eq!(
            convert_links("[a](x.html \"Title\") ![b](y.png \"Pic\")"),
            "<a href=\"x.html\" title=\"Title\">a</a> <img src=\"y.png\" alt=\"b\" title=\"Pic\">"
        );
    }

    #[test]
    fn test_emphasis_markers_in_urls_are_untouched() {
        assert_eq!(
            convert_text("[p](https://x.com/_a_/b)", None),
            "<a href=\"https://x.com/_a_/b\">p</a>"
        );
        assert_eq!(convert_text("[p](a*b*c)", None), "<a href=\"a*b*c\">p</a>");
        assert_eq!(
            convert_text("![i](img/_t_.png)", None),
            "<img src=\"img/_t_.png\" alt=\"i\">"
        );
    }

    #[test]
    fn test_link_text_still_gets_emphasis() {
        assert_eq!(
            convert_text("see [*the* docs](d_x_.html) and _this_", None),
            "see <a href=\"d_x_.html\"><em>the</em> docs</a> and <em>this</em>"
        );
        assert_eq!(
            convert_text("![*a*](i.png)", None),
            "<img src=\"i.png\" alt=\"*a*\">"
        );
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        assert_eq!(
            convert_links("[a](x<y> \"t<b>\")"),
            "<a href=\"x&lt;y&gt;\" title=\"t&lt;b&gt;\">a</a>"
        );
        assert_eq!(
            convert_links("![say \"hi\"](p.png)"),
            "<img src=\"p.png\" alt=\"say &quot;hi&quot;\">"
        );
    }

    #[test]
    fn test_placeholder_never_enters_an_attribute() {
        let token = crate::protect::placeholder_token(crate::protect::SpanKind::Inline, 0);
        let titled = format!("[a](u \"{}\")", token);
        assert_eq!(convert_links(&titled), titled);
        let target = format!("[a]({})", token);
        assert_eq!(convert_links(&target), target);
        let alt = format!("![{}](i.png)", token);
        assert!(!convert_links(&alt).contains("alt="));
        let text = format!("[{}](u)", token);
        assert_eq!(convert_links(&text), format!("<a href=\"u\">{}</a>", token));
    }

    #[test]
    fn test_incomplete_links_stay_literal() {
        assert_eq!(convert_links("[text]"), "[text]");
        assert_eq!(convert_links("[text]()"), "[text]()");
        assert_eq!(convert_links("[text] (url)"), "[text] (url)");
    }

    #[test]
    fn test_checkboxes() {
        let glyphs = CheckboxGlyphs::default();
        assert_eq!(convert_checkboxes("[ ] todo", &glyphs), "\u{2610} todo");
        assert_eq!(convert_checkboxes("[x] done", &glyphs), "\u{2611} done");
        assert_eq!(convert_checkboxes("[X] done", &glyphs), "\u{2611} done");
        assert_eq!(convert_checkboxes("items[x] = 1", &glyphs), "items[x] = 1");
    }

    #[test]
    fn test_custom_checkbox_glyphs() {
        let glyphs = CheckboxGlyphs {
            unchecked: "<input type=\"checkbox\">".to_string(),
            checked: "<input type=\"checkbox\" checked>".to_string(),
        };
        assert_eq!(
            convert_text("[x] shipped", Some(&glyphs)),
            "<input type=\"checkbox\" checked> shipped"
        );
    }

    #[test]
    fn test_link_wins_over_checkbox() {
        let html = convert_text("[x](page.html)", Some(&CheckboxGlyphs::default()));
        assert_eq!(html, "<a href=\"page.html\">x</a>");
    }

    #[test]
    fn test_tags_are_not_rewritten() {
        assert_eq!(
            convert_text("<h2 id=\"-_x_-\">_x_</h2>", None),
            "<h2 id=\"-_x_-\"><em>x</em></h2>"
        );
        assert_eq!(
            convert_text("<a href=\"/*a*/\">*b*</a>", None),
            "<a href=\"/*a*/\"><em>b</em></a>"
        );
    }

    #[test]
    fn test_sealed_segments_are_skipped() {
        let segments = vec![
            Segment::Text("*a*".into()),
            Segment::Block("<li>*b*</li>".into()),
            Segment::Sealed("<blockquote>*c*</blockquote>".into()),
        ];
        let output = convert_inline(segments, None);
        assert_eq!(output[0], Segment::Text("<em>a</em>".into()));
        assert_eq!(output[1], Segment::Block("<li><em>b</em></li>".into()));
        assert_eq!(output[2], Segment::Sealed("<blockquote>*c*</blockquote>".into()));
    }

    #[test]
    fn test_checkboxes_only_with_glyphs() {
        assert_eq!(convert_text("[ ] open", None), "[ ] open");
    }

    proptest! {
        #[test]
        fn prop_marker_free_text_is_unchanged(text in "[a-zA-Z0-9 .,;:!?()-]{0,80}") {
            prop_assert_eq!(
                convert_text(&text, Some(&CheckboxGlyphs::default())),
                text
            );
        }

        #[test]
        fn prop_emphasis_tags_are_balanced(text in "[a-z *_]{0,40}") {
            let html = convert_emphasis(&text);
            prop_assert_eq!(html.matches("<em>").count(), html.matches("</em>").count());
            prop_assert_eq!(
                html.matches("<strong>").count(),
                html.matches("</strong>").count()
            );
        }
    }
}
