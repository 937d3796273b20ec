//! Detail-Record procedure: the bound page describes exactly one book.

use tracing::debug;

use crate::cancel::Cancellation;
use crate::error::Result;
use crate::query::ContentQuery;
use crate::result::{SearchBook, Variables};
use crate::rule;

use super::fields::{non_empty, FieldRules};
use super::Extraction;

/// Reads one record from the bound page using the source's detail rules.
///
/// The book URL is the page URL. The cover link is stored exactly as the
/// rule returns it; detail rules are expected to produce absolute links.
/// Returns `None` when the page yields no name.
///
/// An `init` rule that matches nothing is not an error: fields are then read
/// from the whole page.
pub(crate) fn detail_record<Q, C>(
    ex: &mut Extraction<'_, Q, C>,
    page_vars: &Variables,
) -> Result<Option<SearchBook>>
where
    Q: ContentQuery,
    C: Cancellation + ?Sized,
{
    let mut book = ex.new_book(page_vars);
    book.book_url = ex.base_url.to_string();

    let source = ex.source;
    let info = &source.info_profile;
    if let Some(init) = info.init.as_deref().filter(|r| !r.trim().is_empty()) {
        ex.checkpoint()?;
        debug!(source = %source.url, "running detail init rule");
        let chain = rule::resolve(init)?;
        if let Some(node) = ex.query.query_element(&chain, &mut book.variables)? {
            ex.query.bind_node(&node)?;
        }
    }

    let fields = FieldRules::from_info(info)?;

    book.name = ex.read_string("name", &fields.name, false, &mut book.variables, true)?;
    if book.name.is_empty() {
        return Ok(None);
    }

    ex.read_details(&fields, &mut book, true)?;

    let cover = ex.read_string("coverUrl", &fields.cover_url, true, &mut book.variables, true)?;
    book.cover_url = non_empty(cover);

    Ok(Some(book))
}
