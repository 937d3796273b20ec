//! Book source definitions.
//!
//! A [`SourceConfig`] is the immutable per-site configuration: identity,
//! ordering weight, an optional detail-page URL pattern, and the rule
//! profiles used to pull records out of search, explore and detail pages.
//!
//! Field names follow the camelCase JSON of published book-source files so
//! existing definitions load unchanged.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of content a source serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum SourceType {
    /// Novels and other text.
    #[default]
    Text,
    /// Audio books.
    Audio,
    /// Comics and image galleries.
    Image,
    /// Downloadable files.
    File,
}

impl From<i32> for SourceType {
    fn from(tag: i32) -> Self {
        match tag {
            1 => Self::Audio,
            2 => Self::Image,
            3 => Self::File,
            _ => Self::Text,
        }
    }
}

impl From<SourceType> for i32 {
    fn from(kind: SourceType) -> Self {
        match kind {
            SourceType::Text => 0,
            SourceType::Audio => 1,
            SourceType::Image => 2,
            SourceType::File => 3,
        }
    }
}

/// Rules for a list page (search results or an explore category).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookListRule {
    /// Variable initialization rule, evaluated once per page for its `@put`s.
    pub init: Option<String>,
    /// List-container rule. A leading `-` reverses the output order.
    pub book_list: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub intro: Option<String>,
    pub kind: Option<String>,
    pub last_chapter: Option<String>,
    pub book_url: Option<String>,
    pub cover_url: Option<String>,
    pub word_count: Option<String>,
}

/// Rules for a single book's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookInfoRule {
    /// Narrows the content to a sub-region before any field is read.
    pub init: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub intro: Option<String>,
    pub kind: Option<String>,
    pub last_chapter: Option<String>,
    pub cover_url: Option<String>,
    pub word_count: Option<String>,
}

/// Immutable configuration of one book source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceConfig {
    /// Origin identifier, usually the site's base URL.
    #[serde(rename = "bookSourceUrl")]
    pub url: String,

    /// Display name.
    #[serde(rename = "bookSourceName")]
    pub name: String,

    #[serde(rename = "bookSourceType")]
    pub source_type: SourceType,

    /// Ordering weight among sources.
    pub custom_order: i32,

    /// Regular expression matching this source's detail-page URLs.
    ///
    /// The whole URL must match, not a substring of it.
    pub book_url_pattern: Option<String>,

    #[serde(rename = "ruleSearch")]
    pub search_profile: BookListRule,

    #[serde(rename = "ruleExplore")]
    pub explore_profile: BookListRule,

    #[serde(rename = "ruleBookInfo")]
    pub info_profile: BookInfoRule,
}

impl SourceConfig {
    /// Parses one source from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a JSON array of sources, or a single source object.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        if json.trim_start().starts_with('[') {
            Ok(serde_json::from_str(json)?)
        } else {
            Ok(vec![Self::from_json(json)?])
        }
    }

    /// The detail-page URL pattern, if one is configured and non-empty.
    #[must_use]
    pub fn detail_url_pattern(&self) -> Option<&str> {
        self.book_url_pattern.as_deref().filter(|p| !p.is_empty())
    }

    /// Picks the list profile for a page.
    ///
    /// Search pages always use the search profile. Explore pages fall back to
    /// it when the explore profile has no list-container rule.
    #[must_use]
    pub fn list_profile(&self, is_search: bool) -> &BookListRule {
        if is_search || is_blank(self.explore_profile.book_list.as_deref()) {
            &self.search_profile
        } else {
            &self.explore_profile
        }
    }
}

/// `None`, empty and whitespace-only rules are blank.
#[must_use]
pub fn is_blank(rule: Option<&str>) -> bool {
    rule.is_none_or(|r| r.trim().is_empty())
}
