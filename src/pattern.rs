//! Lazily compiled regular expressions shared by the conversion passes

use regex::Regex;
use std::sync::OnceLock;

/// Compile `pattern` once and cache it in `cell`
///
/// Returns `None` if the pattern fails to compile; passes treat that as "no
/// match" and leave their input untouched rather than panicking.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::error!("failed to compile pattern {:?}: {}", pattern, e);
            None
        }
    })
    .as_ref()
}
