//! Fallback rule chains and their short-circuiting evaluation.

use crate::error::Result;

use super::fragment::{Link, RuleFragment};

/// Ordered, fallback-capable sequence of rule fragments for one field.
///
/// Fragments group into alternatives: each `||` starts a new alternative and
/// each `&&` adds a required fragment to the current one. Evaluation returns
/// the first alternative whose joined result is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleChain {
    fragments: Vec<RuleFragment>,
}

impl RuleChain {
    /// The empty chain. Evaluates to an empty string.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a chain from already parsed fragments.
    ///
    /// The first fragment's link is forced to [`Link::First`].
    #[must_use]
    pub fn from_fragments(mut fragments: Vec<RuleFragment>) -> Self {
        if let Some(first) = fragments.first_mut() {
            first.link = Link::First;
        }
        Self { fragments }
    }

    #[must_use]
    pub fn fragments(&self) -> &[RuleFragment] {
        &self.fragments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Alternatives in chain order, each one a run of `&&`-joined fragments.
    pub fn alternatives(&self) -> impl Iterator<Item = &[RuleFragment]> {
        self.fragments.chunk_by(|_, next| next.link == Link::And)
    }

    /// Evaluates the chain to a single string.
    ///
    /// `eval` runs one fragment against the bound content. Results inside an
    /// alternative are post-processed, and the non-empty ones are joined with
    /// `\n`. The first non-empty alternative wins; later ones are never
    /// evaluated. Errors from `eval` propagate unchanged.
    pub fn evaluate<F>(&self, mut eval: F) -> Result<String>
    where
        F: FnMut(&RuleFragment) -> Result<String>,
    {
        for alternative in self.alternatives() {
            let mut parts = Vec::with_capacity(alternative.len());
            for fragment in alternative {
                let value = fragment.post_process(eval(fragment)?);
                if !value.is_empty() {
                    parts.push(value);
                }
            }
            if !parts.is_empty() {
                return Ok(parts.join("\n"));
            }
        }
        Ok(String::new())
    }

    /// Evaluates the chain to a list of strings with the same fallback rules.
    pub fn evaluate_list<F>(&self, mut eval: F) -> Result<Vec<String>>
    where
        F: FnMut(&RuleFragment) -> Result<Vec<String>>,
    {
        for alternative in self.alternatives() {
            let mut values = Vec::new();
            for fragment in alternative {
                for value in eval(fragment)? {
                    let value = fragment.post_process(value);
                    if !value.is_empty() {
                        values.push(value);
                    }
                }
            }
            if !values.is_empty() {
                return Ok(values);
            }
        }
        Ok(Vec::new())
    }
}
