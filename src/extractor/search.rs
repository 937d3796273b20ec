//! Search-Record procedure: one node of a list page.

use crate::cancel::Cancellation;
use crate::error::Result;
use crate::query::ContentQuery;
use crate::result::{SearchBook, Variables};

use super::fields::FieldRules;
use super::Extraction;

/// Reads one record from a list node.
///
/// Returns `None` when the node yields no name. A relative cover link is
/// resolved against the page URL; an empty book URL falls back to the page
/// URL.
pub(crate) fn search_record<Q, C>(
    ex: &mut Extraction<'_, Q, C>,
    node: &Q::Node,
    fields: &FieldRules,
    page_vars: &Variables,
    verbose: bool,
) -> Result<Option<SearchBook>>
where
    Q: ContentQuery,
    C: Cancellation + ?Sized,
{
    let mut book = ex.new_book(page_vars);
    ex.query.bind_node(node)?;

    book.name = ex.read_string("name", &fields.name, false, &mut book.variables, verbose)?;
    if book.name.is_empty() {
        return Ok(None);
    }

    ex.read_details(fields, &mut book, verbose)?;

    let cover = ex.read_string("coverUrl", &fields.cover_url, false, &mut book.variables, verbose)?;
    if !cover.is_empty() {
        book.cover_url = Some((ex.options.url_resolver)(ex.base_url, &cover));
    }

    let book_url = ex.read_string("bookUrl", &fields.book_url, true, &mut book.variables, verbose)?;
    book.book_url = if book_url.is_empty() {
        ex.base_url.to_string()
    } else {
        book_url
    };

    Ok(Some(book))
}
