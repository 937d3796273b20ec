//! Error types for rs-booklist.
//!
//! Call-level failures only. A record that comes out without a name is not an
//! error; it is dropped by the extractor.

use crate::rule::Dialect;

/// Error type for list analysis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The fetch layer handed over no body for the requested URL.
    #[error("failed to get web content: {url}")]
    ContentMissing {
        /// The URL that was requested.
        url: String,
    },

    /// The caller's cancellation signal was observed at a checkpoint.
    #[error("extraction cancelled")]
    Cancelled,

    /// A rule expression could not be interpreted.
    #[error("invalid rule `{rule}`: {reason}")]
    InvalidRule {
        /// The offending rule text.
        rule: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The content-query backend cannot evaluate this dialect.
    #[error("unsupported rule dialect: {0:?}")]
    UnsupportedDialect(Dialect),

    /// The source's detail-page URL pattern is not a valid regular expression.
    #[error("invalid book url pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A book source definition could not be parsed.
    #[error("invalid book source: {0}")]
    Config(#[from] serde_json::Error),

    /// Opaque failure raised by a content-query collaborator.
    #[error("content query failed: {0}")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Builds an [`Error::InvalidRule`].
    pub(crate) fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for list analysis.
pub type Result<T> = std::result::Result<T, Error>;
