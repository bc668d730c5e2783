//! Source text preparation
//!
//! The engine itself works on decoded text. Callers that hold raw bytes (the
//! CLI, the C ABI) go through [`decode_markdown`], which picks an encoding with
//! a short cascade:
//!
//! 1. **Byte order mark**: UTF-8, UTF-16LE and UTF-16BE BOMs win over anything else
//! 2. **Explicit label**: a charset label supplied by the caller (e.g. `windows-1252`)
//! 3. **Default to UTF-8**
//!
//! Every entry point then normalises line endings and splits the text into the
//! line sequence the block passes operate on.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::ConversionError;

/// Default charset when no BOM or label is present
const DEFAULT_CHARSET: &str = "UTF-8";

/// Decode markdown source bytes to a UTF-8 string
///
/// # Arguments
///
/// * `bytes` - Raw document bytes
/// * `charset` - Optional charset label (WHATWG label names, case-insensitive)
///
/// # Errors
///
/// - `ConversionError::EncodingError`: the label is unknown, or the bytes are
///   invalid for the selected encoding
///
/// # Examples
///
/// ```rust
/// use markdown_html_converter::source::decode_markdown;
///
/// let text = decode_markdown(b"# Title", None).expect("valid UTF-8");
/// assert_eq!(text, "# Title");
///
/// // windows-1252 0xE9 is e-acute
/// let text = decode_markdown(b"caf\xE9", Some("windows-1252")).expect("decodes");
/// assert_eq!(text, "caf\u{e9}");
/// ```
pub fn decode_markdown(bytes: &[u8], charset: Option<&str>) -> Result<String, ConversionError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        log::debug!("decoding source as {} (byte order mark)", encoding.name());
        return decode_with(encoding, &bytes[bom_len..]);
    }

    let label = charset.map(str::trim).filter(|label| !label.is_empty());
    match label {
        Some(label) if !label.eq_ignore_ascii_case(DEFAULT_CHARSET) => {
            let encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                ConversionError::EncodingError(format!("Unsupported charset '{}'", label))
            })?;
            log::debug!("decoding source as {} (label '{}')", encoding.name(), label);
            decode_with(encoding, bytes)
        }
        _ => std::str::from_utf8(bytes).map(str::to_owned).map_err(|e| {
            ConversionError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}: {}",
                e.valid_up_to(),
                e
            ))
        }),
    }
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, ConversionError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| {
            ConversionError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                encoding.name()
            ))
        })
}

/// Normalise CRLF and lone CR line endings to LF
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Split a document into its line sequence
///
/// Line terminators are removed. A trailing newline does not produce a final
/// empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    normalize_line_endings(text)
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Width of a line's leading whitespace, counting a tab as four columns
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Whether a line is empty or whitespace only
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_utf8_default() {
        let text = decode_markdown("# Caf\u{e9}".as_bytes(), None).expect("decode failed");
        assert_eq!(text, "# Caf\u{e9}");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let result = decode_markdown(b"plain \xC3\x28 text", Some("utf-8"));
        match result {
            Err(ConversionError::EncodingError(msg)) => assert!(msg.contains("Invalid UTF-8")),
            other => panic!("Expected EncodingError, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_with_label() {
        let text = decode_markdown(b"na\xEFve", Some("ISO-8859-1")).expect("decode failed");
        assert_eq!(text, "na\u{ef}ve");
    }

    #[test]
    fn test_decode_unknown_label() {
        let result = decode_markdown(b"text", Some("x-made-up"));
        assert!(matches!(result, Err(ConversionError::EncodingError(_))));
    }

    #[test]
    fn test_bom_overrides_label() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("\u{2713} done".as_bytes());
        let text = decode_markdown(&bytes, Some("windows-1252")).expect("decode failed");
        assert_eq!(text, "\u{2713} done");
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "# Hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let text = decode_markdown(&bytes, None).expect("decode failed");
        assert_eq!(text, "# Hi");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_markdown(b"", None).expect("decode failed"), "");
    }

    #[test]
    fn test_split_lines_mixed_endings() {
        let lines = split_lines("a\r\nb\rc\nd\n");
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("    x"), 4);
        assert_eq!(indent_width("\tx"), 4);
        assert_eq!(indent_width("  \tx"), 6);
        assert_eq!(indent_width("x"), 0);
    }

    proptest! {
        #[test]
        fn prop_split_lines_ignores_line_ending_style(
            lines in prop::collection::vec("[a-z ]{0,12}", 1..8),
        ) {
            let lf = lines.join("\n");
            let crlf = lines.join("\r\n");
            prop_assert_eq!(split_lines(&lf), split_lines(&crlf));
        }
    }
}
