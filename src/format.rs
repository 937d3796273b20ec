//! Field normalization helpers.

use crate::patterns::{AUTHOR_PREFIX, AUTHOR_SUFFIX, WHITESPACE};

/// Normalize an author string pulled from a page.
///
/// Strips a leading "author" label and trailing `作品集`/`著` decorations, then
/// collapses whitespace runs to single spaces.
///
/// # Examples
/// ```
/// use rs_booklist::format::format_author;
///
/// assert_eq!(format_author("作者：天蚕土豆"), "天蚕土豆");
/// assert_eq!(format_author("  Author:  Frank   Herbert "), "Frank Herbert");
/// ```
#[must_use]
pub fn format_author(author: &str) -> String {
    let without_prefix = AUTHOR_PREFIX.replace(author, "");
    let without_suffix = AUTHOR_SUFFIX.replace(&without_prefix, "");
    WHITESPACE.replace_all(without_suffix.trim(), " ").into_owned()
}
