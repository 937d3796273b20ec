//! Rule Resolver
//!
//! Turns a raw rule expression from a book source into a [`RuleChain`]: an
//! ordered list of dialect-tagged fragments with fallback (`||`) and required
//! (`&&`) links.
//!
//! Resolution is pure. The same expression always yields the same chain, so
//! callers may resolve once and reuse the chain for every node of a page.
//!
//! # Syntax
//!
//! ```text
//! .title@text || h3 a@text          fallback: second runs only if first is empty
//! .tags a@text && .status@text      required: both run, results joined by "\n"
//! @css:.x@text  @json:$.a  $.a  @XPath://a  //a  :regex  @js:code  <js>code</js>
//! .intro@text##pattern##replacement
//! .name@text@put:{"bid":"a@href"}   store variables before evaluating
//! ```
//!
//! Separators inside `{...}` braces or `<js>...</js>` blocks, and anything
//! after a top-level `@js:`, are not split points.

mod chain;
mod fragment;

pub use chain::RuleChain;
pub use fragment::{Dialect, Link, Replacement, RuleFragment};

use std::str::FromStr;

use crate::error::{Error, Result};

/// Resolves a rule expression into a fallback chain.
///
/// Empty or whitespace-only input yields an empty chain.
///
/// # Example
///
/// ```rust
/// use rs_booklist::rule::{resolve, Dialect};
///
/// let chain = resolve("@css:h3.title@text||$.name")?;
/// assert_eq!(chain.len(), 2);
/// assert_eq!(chain.fragments()[0].dialect, Dialect::Css);
/// assert_eq!(chain.fragments()[1].dialect, Dialect::JsonPath);
/// assert!(chain.fragments()[1].is_fallback());
/// # Ok::<(), rs_booklist::Error>(())
/// ```
pub fn resolve(expression: &str) -> Result<RuleChain> {
    let mut fragments = Vec::new();
    for (link, piece) in split_top_level(expression) {
        // A skipped head promotes the next piece to the chain head.
        let link = if fragments.is_empty() { Link::First } else { link };
        if let Some(fragment) = fragment::parse_fragment(piece, link)? {
            fragments.push(fragment);
        }
    }
    Ok(RuleChain::from_fragments(fragments))
}

/// Resolves an optional field rule; `None` yields an empty chain.
pub fn resolve_field(expression: Option<&str>) -> Result<RuleChain> {
    expression.map_or_else(|| Ok(RuleChain::empty()), resolve)
}

impl FromStr for RuleChain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        resolve(s)
    }
}

/// A list-container rule with its ordering prefix removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRule<'a> {
    pub rule: &'a str,
    /// The rule started with `-`: reverse the final record order.
    pub reverse: bool,
}

/// Strips the `-` (reverse) and `+` (no-op) prefixes from a list-container rule.
///
/// # Example
///
/// ```rust
/// use rs_booklist::rule::normalize_list_rule;
///
/// let list = normalize_list_rule("-.item");
/// assert_eq!(list.rule, ".item");
/// assert!(list.reverse);
/// assert!(!normalize_list_rule("+.item").reverse);
/// ```
#[must_use]
pub fn normalize_list_rule(rule: &str) -> ListRule<'_> {
    let (rule, reverse) = match rule.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (rule, false),
    };
    let rule = rule.strip_prefix('+').unwrap_or(rule);
    ListRule { rule, reverse }
}

/// Splits at top-level `||` and `&&`.
fn split_top_level(expression: &str) -> Vec<(Link, &str)> {
    let bytes = expression.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut link = Link::First;
    let mut depth = 0usize;
    let mut in_js = false;
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        if in_js {
            if rest.starts_with(b"</js>") {
                in_js = false;
                i += b"</js>".len();
            } else {
                i += 1;
            }
            continue;
        }
        if rest.starts_with(b"<js>") {
            in_js = true;
            i += b"<js>".len();
            continue;
        }
        if depth == 0 && rest.starts_with(b"@js:") {
            break;
        }
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 {
            let next = if rest.starts_with(b"||") {
                Some(Link::Or)
            } else if rest.starts_with(b"&&") {
                Some(Link::And)
            } else {
                None
            };
            if let Some(next) = next {
                pieces.push((link, &expression[start..i]));
                link = next;
                i += 2;
                start = i;
                continue;
            }
        }
        i += 1;
    }

    pieces.push((link, &expression[start..]));
    pieces
}
