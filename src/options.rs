//! Configuration options for list analysis.
//!
//! The `Options` struct carries the utility collaborators the extractor calls
//! (author normalization, URL absolutization) and a few output knobs.

use crate::format::format_author;
use crate::url_utils::absolute_url;

/// Configuration options for list analysis.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_booklist::Options;
///
/// let options = Options {
///     kind_separator: " / ".to_string(),
///     ..Options::default()
/// };
/// assert!(!options.trace_all_items);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Separator used to join the `kind` string list.
    ///
    /// Default: `","`
    pub kind_separator: String,

    /// Log every extracted field of every list item at `debug` level.
    ///
    /// When false only the first item of a page is logged at `debug`; the
    /// rest go to `trace`.
    ///
    /// Default: `false`
    pub trace_all_items: bool,

    /// Author-name normalization applied to every extracted author.
    ///
    /// Default: [`format_author`]
    pub author_formatter: fn(&str) -> String,

    /// Resolves a list-page cover link against the page URL: `(base, relative)`.
    ///
    /// Default: [`absolute_url`]
    pub url_resolver: fn(&str, &str) -> String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            kind_separator: ",".to_string(),
            trace_all_items: false,
            author_formatter: format_author,
            url_resolver: absolute_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.kind_separator, ",");
        assert!(!opts.trace_all_items);
        assert_eq!((opts.author_formatter)(" 作者：张三 "), "张三");
        assert_eq!(
            (opts.url_resolver)("https://x.com/list", "img.jpg"),
            "https://x.com/img.jpg"
        );
    }

    #[test]
    fn test_collaborators_can_be_replaced() {
        fn upper(s: &str) -> String {
            s.to_uppercase()
        }
        fn keep(_base: &str, rel: &str) -> String {
            rel.to_string()
        }

        let opts = Options {
            author_formatter: upper,
            url_resolver: keep,
            ..Options::default()
        };

        assert_eq!((opts.author_formatter)("ann"), "ANN");
        assert_eq!((opts.url_resolver)("https://x.com/", "a.png"), "a.png");
        assert_eq!(opts.kind_separator, ",");
    }
}
