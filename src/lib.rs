//! # rs-booklist
//!
//! Rule-driven extraction of book records from fetched catalog pages.
//!
//! Given the body of a search or explore page and a book source definition,
//! the engine decides whether the page is a list or a single book's detail
//! page, evaluates each field through fallback rule chains, threads page
//! variables into every record, and returns the records in page order.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_booklist::{analyze, NeverCancel, SourceConfig};
//!
//! let source = SourceConfig::from_json(r#"{
//!     "bookSourceUrl": "https://books.example",
//!     "bookSourceName": "Example",
//!     "ruleSearch": {
//!         "bookList": "li.book",
//!         "name": "h3@text",
//!         "author": ".author@text",
//!         "bookUrl": "a@href"
//!     }
//! }"#)?;
//!
//! let html = r#"<ul>
//!     <li class="book"><h3><a href="/b/1">Dune</a></h3><span class="author">Frank Herbert</span></li>
//!     <li class="book"><h3><a href="/b/2">Emma</a></h3><span class="author">Jane Austen</span></li>
//! </ul>"#;
//!
//! let books = analyze(Some(html), &source, "https://books.example/search?q=x", true, &NeverCancel)?;
//! assert_eq!(books.len(), 2);
//! assert_eq!(books[0].name, "Dune");
//! assert_eq!(books[0].book_url, "/b/1");
//! # Ok::<(), rs_booklist::Error>(())
//! ```
//!
//! ## Pieces
//!
//! - **Rule Resolver** ([`rule`]): splits rule expressions into dialect-tagged
//!   fallback chains
//! - **List Extractor** ([`analyze_book_list`]): detail detection, profile
//!   selection, per-record extraction, reversal, cancellation
//! - **Content query** ([`query`]): the trait the extractor evaluates rules
//!   through, plus the bundled HTML/JSON backend

mod error;
mod extractor;
mod options;
mod patterns;
mod result;

/// Cooperative cancellation signals.
pub mod cancel;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Field normalization helpers (author names).
pub mod format;

/// Content-query capability and the bundled backend.
pub mod query;

/// Rule Resolver: rule expressions to fallback chains.
pub mod rule;

/// Book source definitions.
pub mod source;

/// URL utilities for link absolutization.
pub mod url_utils;

// Public API - re-exports
pub use cancel::{Cancellation, Liveness, NeverCancel};
pub use error::{Error, Result};
pub use extractor::{analyze_book_list, FieldRules};
pub use options::Options;
pub use query::{ContentQuery, DomQuery};
pub use result::{SearchBook, Variables};
pub use rule::{resolve, RuleChain};
pub use source::{BookInfoRule, BookListRule, SourceConfig, SourceType};

/// Extracts the books on a fetched page with default options.
///
/// # Arguments
///
/// * `body` - The fetched page, or `None` if the fetch returned nothing
/// * `source` - The book source whose rules apply
/// * `base_url` - The URL the body was fetched from
/// * `is_search` - Search results page (`true`) or explore page (`false`)
/// * `cancel` - Polled between steps; a set signal aborts with [`Error::Cancelled`]
pub fn analyze<C>(
    body: Option<&str>,
    source: &SourceConfig,
    base_url: &str,
    is_search: bool,
    cancel: &C,
) -> Result<Vec<SearchBook>>
where
    C: Cancellation + ?Sized,
{
    analyze_with_options(body, source, base_url, is_search, cancel, &Options::default())
}

/// Extracts the books on a fetched page with custom options.
///
/// Each call uses a fresh [`DomQuery`]; nothing is shared between calls.
///
/// # Example
///
/// ```rust
/// use rs_booklist::{analyze_with_options, NeverCancel, Options, SourceConfig};
///
/// let source = SourceConfig::from_json(r#"{
///     "bookSourceUrl": "https://books.example",
///     "ruleSearch": { "bookList": ".b", "name": "@text", "kind": "i@text" }
/// }"#)?;
/// let options = Options {
///     kind_separator: " / ".to_string(),
///     ..Options::default()
/// };
///
/// let html = r#"<div class="b">Dune<i>sf</i><i>classic</i></div>"#;
/// let books = analyze_with_options(Some(html), &source, "https://books.example/s", true, &NeverCancel, &options)?;
/// assert_eq!(books[0].kind.as_deref(), Some("sf / classic"));
/// # Ok::<(), rs_booklist::Error>(())
/// ```
pub fn analyze_with_options<C>(
    body: Option<&str>,
    source: &SourceConfig,
    base_url: &str,
    is_search: bool,
    cancel: &C,
    options: &Options,
) -> Result<Vec<SearchBook>>
where
    C: Cancellation + ?Sized,
{
    let mut query = DomQuery::new();
    analyze_book_list(&mut query, body, source, base_url, is_search, cancel, options)
}
