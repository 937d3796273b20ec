//! Field rule chains and checkpointed field reads.

use tracing::{debug, trace};

use crate::cancel::Cancellation;
use crate::error::Result;
use crate::query::ContentQuery;
use crate::result::{SearchBook, Variables};
use crate::rule::{resolve_field, RuleChain};
use crate::source::{BookInfoRule, BookListRule};

use super::Extraction;

/// The eight field chains of one profile, resolved once per page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    pub name: RuleChain,
    pub book_url: RuleChain,
    pub author: RuleChain,
    pub cover_url: RuleChain,
    pub intro: RuleChain,
    pub kind: RuleChain,
    pub last_chapter: RuleChain,
    pub word_count: RuleChain,
}

impl FieldRules {
    /// Chains for list items.
    pub fn from_list(rule: &BookListRule) -> Result<Self> {
        Ok(Self {
            name: resolve_field(rule.name.as_deref())?,
            book_url: resolve_field(rule.book_url.as_deref())?,
            author: resolve_field(rule.author.as_deref())?,
            cover_url: resolve_field(rule.cover_url.as_deref())?,
            intro: resolve_field(rule.intro.as_deref())?,
            kind: resolve_field(rule.kind.as_deref())?,
            last_chapter: resolve_field(rule.last_chapter.as_deref())?,
            word_count: resolve_field(rule.word_count.as_deref())?,
        })
    }

    /// Chains for a detail page. The book URL is never read there.
    pub fn from_info(rule: &BookInfoRule) -> Result<Self> {
        Ok(Self {
            name: resolve_field(rule.name.as_deref())?,
            book_url: RuleChain::empty(),
            author: resolve_field(rule.author.as_deref())?,
            cover_url: resolve_field(rule.cover_url.as_deref())?,
            intro: resolve_field(rule.intro.as_deref())?,
            kind: resolve_field(rule.kind.as_deref())?,
            last_chapter: resolve_field(rule.last_chapter.as_deref())?,
            word_count: resolve_field(rule.word_count.as_deref())?,
        })
    }
}

impl<Q, C> Extraction<'_, Q, C>
where
    Q: ContentQuery,
    C: Cancellation + ?Sized,
{
    /// Checkpoint, then read one string field.
    pub fn read_string(
        &mut self,
        field: &str,
        chain: &RuleChain,
        is_url: bool,
        vars: &mut Variables,
        verbose: bool,
    ) -> Result<String> {
        self.checkpoint()?;
        let value = self.query.query_string(chain, is_url, vars)?;
        self.log_field(field, &value, verbose);
        Ok(value)
    }

    /// Checkpoint, then read a multi-valued field joined with the kind separator.
    pub fn read_joined(
        &mut self,
        field: &str,
        chain: &RuleChain,
        vars: &mut Variables,
        verbose: bool,
    ) -> Result<String> {
        self.checkpoint()?;
        let value = self
            .query
            .query_string_list(chain, vars)?
            .join(&self.options.kind_separator);
        self.log_field(field, &value, verbose);
        Ok(value)
    }

    /// Reads author, kind, word count, latest chapter and intro, in that order.
    ///
    /// Shared by the detail and list procedures once a name has been found.
    pub fn read_details(
        &mut self,
        fields: &FieldRules,
        book: &mut SearchBook,
        verbose: bool,
    ) -> Result<()> {
        let author = self.read_string("author", &fields.author, false, &mut book.variables, verbose)?;
        book.author = (self.options.author_formatter)(&author);

        let kind = self.read_joined("kind", &fields.kind, &mut book.variables, verbose)?;
        book.kind = non_empty(kind);

        let word_count =
            self.read_string("wordCount", &fields.word_count, false, &mut book.variables, verbose)?;
        book.word_count = non_empty(word_count);

        let latest =
            self.read_string("lastChapter", &fields.last_chapter, false, &mut book.variables, verbose)?;
        book.latest_chapter_title = non_empty(latest);

        let intro = self.read_string("intro", &fields.intro, false, &mut book.variables, verbose)?;
        book.intro = non_empty(intro);
        Ok(())
    }

    fn log_field(&self, field: &str, value: &str, verbose: bool) {
        if verbose {
            debug!(source = %self.source.url, field, value);
        } else {
            trace!(source = %self.source.url, field, value);
        }
    }
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
