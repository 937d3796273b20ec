//! URL utility functions.
//!
//! Absolutization of page-relative links found on list pages. Detail-page
//! links are never passed through here.

use url::Url;

/// Check if a string is an absolute http(s) URL with a host.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() {
        return (false, None);
    }

    // Must start with http:// or https://
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Resolve `relative` against the page URL `base`.
///
/// Special URLs (`data:`, `javascript:`, `mailto:`, `tel:`) and links that are
/// already absolute come back as given. If `base` is not an absolute URL, or
/// the join fails, the trimmed input is returned unchanged.
///
/// # Examples
/// ```
/// use rs_booklist::url_utils::absolute_url;
///
/// assert_eq!(absolute_url("https://x.com/list", "img.jpg"), "https://x.com/img.jpg");
/// assert_eq!(absolute_url("https://x.com/a/b", "//cdn.x.com/c.png"), "https://cdn.x.com/c.png");
/// assert_eq!(absolute_url("not a url", "img.jpg"), "img.jpg");
/// ```
#[must_use]
pub fn absolute_url(base: &str, relative: &str) -> String {
    let relative = relative.trim();

    if relative.is_empty() {
        return String::new();
    }

    if relative.starts_with("data:")
        || relative.starts_with("javascript:")
        || relative.starts_with("mailto:")
        || relative.starts_with("tel:")
    {
        return relative.to_string();
    }

    if is_absolute_url(relative).0 {
        return relative.to_string();
    }

    let (_, Some(base)) = is_absolute_url(base) else {
        return relative.to_string();
    };

    match base.join(relative) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => relative.to_string(),
    }
}
