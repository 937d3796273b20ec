//! Result types for list analysis output.
//!
//! A [`SearchBook`] is one extracted catalog record. [`Variables`] is the
//! page-scoped key/value state that rules write with `@put` and read with
//! `@get`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::source::SourceType;

/// Page-scoped variable mapping.
///
/// Created fresh for every `analyze` call. Each record gets its own copy of
/// the page variables when its extraction starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Number of stored variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One book extracted from a list or detail page.
///
/// Only records with a non-empty `name` are ever returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBook {
    /// Book title.
    pub name: String,

    /// Author, normalized through the author formatter.
    pub author: String,

    /// Link to the book's detail page.
    pub book_url: String,

    /// Origin source identifier (the source URL).
    pub origin: String,

    /// Display name of the origin source.
    pub origin_name: String,

    /// Custom ordering weight of the origin source.
    pub origin_order: i32,

    /// Content type of the origin source.
    #[serde(rename = "type")]
    pub source_type: SourceType,

    /// Cover image URL.
    pub cover_url: Option<String>,

    /// Summary text.
    pub intro: Option<String>,

    /// Categories joined with the configured separator.
    pub kind: Option<String>,

    /// Word count as written by the site.
    pub word_count: Option<String>,

    /// Title of the most recent chapter.
    pub latest_chapter_title: Option<String>,

    /// Snapshot of the variable context after this record was extracted.
    #[serde(rename = "variable", default, skip_serializing_if = "Variables::is_empty")]
    pub variables: Variables,

    /// Raw body of the fetched page when it doubles as this book's detail page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_html: Option<String>,
}
