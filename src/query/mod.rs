//! Content-query capability.
//!
//! The extractor never looks at markup itself. It resolves rules into
//! [`RuleChain`]s and asks a [`ContentQuery`] backend to evaluate them against
//! the currently bound content. [`DomQuery`] is the bundled backend for HTML
//! and JSON pages; callers with their own rule interpreter implement the
//! trait instead.

mod backend;
mod json_path;

pub use backend::{DomNode, DomQuery};
pub use json_path::{JsonPath, Segment};

use std::borrow::Cow;

use crate::error::Result;
use crate::patterns::GET_VARIABLE;
use crate::result::Variables;
use crate::rule::{self, RuleChain, RuleFragment};

/// Evaluation context the extractor drives.
///
/// A backend holds one binding at a time. [`bind`](Self::bind) replaces it
/// with a fetched body; [`bind_node`](Self::bind_node) narrows it to a node
/// the backend returned earlier. All query methods follow the fallback
/// semantics of [`RuleChain`]: the first non-empty alternative wins and an
/// empty chain yields an empty result.
pub trait ContentQuery {
    /// Opaque handle to a matched node.
    type Node;

    /// Binds a fetched body and the URL it came from.
    fn bind(&mut self, body: &str, base_url: &str) -> Result<()>;

    /// Narrows evaluation to `node`.
    fn bind_node(&mut self, node: &Self::Node) -> Result<()>;

    /// All nodes matching a list-container rule, in page order.
    fn query_nodes(&mut self, rule: &RuleChain, vars: &mut Variables) -> Result<Vec<Self::Node>>;

    /// First node matching `rule`.
    fn query_element(
        &mut self,
        rule: &RuleChain,
        vars: &mut Variables,
    ) -> Result<Option<Self::Node>> {
        Ok(self.query_nodes(rule, vars)?.into_iter().next())
    }

    /// Single string value.
    ///
    /// With `is_url` set the backend returns a link as written (decoded but
    /// never absolutized).
    fn query_string(&mut self, rule: &RuleChain, is_url: bool, vars: &mut Variables)
        -> Result<String>;

    /// Multi-valued field.
    fn query_string_list(&mut self, rule: &RuleChain, vars: &mut Variables) -> Result<Vec<String>>;
}

/// Replaces every `@get:{key}` in `text` with the variable's value.
///
/// Unset variables become empty strings.
#[must_use]
pub fn substitute_variables<'a>(text: &'a str, vars: &Variables) -> Cow<'a, str> {
    substitute_with(text, |key| vars.get(key))
}

/// Replaces every `@get:{key}` using `lookup`; misses become empty strings.
pub(crate) fn substitute_with<'a, 'v, F>(text: &'a str, lookup: F) -> Cow<'a, str>
where
    F: Fn(&str) -> Option<&'v str>,
{
    if !text.contains("@get:") {
        return Cow::Borrowed(text);
    }
    GET_VARIABLE.replace_all(text, |caps: &regex::Captures<'_>| {
        lookup(&caps[1]).unwrap_or_default().to_string()
    })
}

/// Runs a fragment's `@put` assignments against the bound content.
///
/// Each put rule is resolved and evaluated as a string; the result is stored
/// under its key before the fragment itself is evaluated.
pub fn apply_puts<Q>(query: &mut Q, fragment: &RuleFragment, vars: &mut Variables) -> Result<()>
where
    Q: ContentQuery + ?Sized,
{
    for (key, put_rule) in &fragment.puts {
        let chain = rule::resolve(put_rule)?;
        let value = query.query_string(&chain, false, vars)?;
        vars.put(key.clone(), value);
    }
    Ok(())
}
