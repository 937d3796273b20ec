//! List Extractor
//!
//! Orchestrates one `analyze` call: detail-page detection, profile selection,
//! list enumeration, per-record extraction, variable propagation, reversal and
//! cancellation checkpoints.
//!
//! # Module Structure
//!
//! - `fields`: hoisted field rule chains and checkpointed field reads
//! - `detail`: the Detail-Record procedure (a page that is one book)
//! - `search`: the Search-Record procedure (one node of a list page)

mod detail;
mod fields;
mod search;

use regex::Regex;
use tracing::debug;

use crate::cancel::Cancellation;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::query::ContentQuery;
use crate::result::{SearchBook, Variables};
use crate::rule::{self, normalize_list_rule};
use crate::source::SourceConfig;

pub use fields::FieldRules;

/// Everything one `analyze` call threads through its record procedures.
pub(crate) struct Extraction<'a, Q, C: ?Sized> {
    pub query: &'a mut Q,
    pub source: &'a SourceConfig,
    pub base_url: &'a str,
    pub cancel: &'a C,
    pub options: &'a Options,
}

impl<Q, C> Extraction<'_, Q, C>
where
    Q: ContentQuery,
    C: Cancellation + ?Sized,
{
    /// Fails with [`Error::Cancelled`] once the caller's signal is set.
    pub fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            debug!(source = %self.source.url, "extraction cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// A record stamped with origin metadata, starting from the page variables.
    pub fn new_book(&self, page_vars: &Variables) -> SearchBook {
        SearchBook {
            origin: self.source.url.clone(),
            origin_name: self.source.name.clone(),
            origin_order: self.source.custom_order,
            source_type: self.source.source_type,
            variables: page_vars.clone(),
            ..SearchBook::default()
        }
    }
}

/// Extracts the books on a fetched page using `query` as the rule interpreter.
///
/// `body` is the fetched content of `base_url`; `None` means the fetch
/// produced nothing and fails with [`Error::ContentMissing`]. The page is
/// treated as a single book's detail page when the source's detail URL
/// pattern matches `base_url`, or when the list rule matches nothing and no
/// pattern is configured. Otherwise every list node becomes at most one
/// record, in page order, reversed when the list rule starts with `-`.
///
/// Cancellation is checked on entry, before binding, before every list node
/// and before every field read. A cancelled call returns no records.
pub fn analyze_book_list<Q, C>(
    query: &mut Q,
    body: Option<&str>,
    source: &SourceConfig,
    base_url: &str,
    is_search: bool,
    cancel: &C,
    options: &Options,
) -> Result<Vec<SearchBook>>
where
    Q: ContentQuery,
    C: Cancellation + ?Sized,
{
    let body = body.ok_or_else(|| Error::ContentMissing {
        url: base_url.to_string(),
    })?;
    debug!(source = %source.url, url = base_url, "content fetched");

    let mut ex = Extraction {
        query,
        source,
        base_url,
        cancel,
        options,
    };
    ex.checkpoint()?;

    let mut page_vars = Variables::new();
    ex.query.bind(body, base_url)?;

    if let Some(pattern) = source.detail_url_pattern() {
        let detail_url = Regex::new(&format!("^(?:{pattern})$"))?;
        if detail_url.is_match(base_url) {
            debug!(source = %source.url, "url is a detail page");
            return Ok(detail::detail_record(&mut ex, &page_vars)?
                .map(|book| with_info_html(book, body))
                .into_iter()
                .collect());
        }
    }

    let profile = source.list_profile(is_search);
    if let Some(init) = profile.init.as_deref().filter(|r| !r.trim().is_empty()) {
        ex.checkpoint()?;
        debug!(source = %source.url, "running list init rule");
        ex.query.query_string(&rule::resolve(init)?, false, &mut page_vars)?;
    }

    let list_rule = normalize_list_rule(profile.book_list.as_deref().unwrap_or_default());
    let nodes = ex
        .query
        .query_nodes(&rule::resolve(list_rule.rule)?, &mut page_vars)?;

    if nodes.is_empty() && source.detail_url_pattern().is_none() {
        debug!(source = %source.url, "list is empty, reading page as a detail page");
        return Ok(detail::detail_record(&mut ex, &page_vars)?
            .map(|book| with_info_html(book, body))
            .into_iter()
            .collect());
    }

    let fields = FieldRules::from_list(profile)?;
    debug!(source = %source.url, size = nodes.len(), "list size");

    let mut books = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        ex.checkpoint()?;
        let verbose = index == 0 || options.trace_all_items;
        if let Some(book) = search::search_record(&mut ex, node, &fields, &page_vars, verbose)? {
            let book = if book.book_url == base_url {
                with_info_html(book, body)
            } else {
                book
            };
            books.push(book);
        }
    }

    if list_rule.reverse {
        debug!(source = %source.url, "reversing list order");
        books.reverse();
    }
    Ok(books)
}

fn with_info_html(mut book: SearchBook, body: &str) -> SearchBook {
    book.info_html = Some(body.to_string());
    book
}
