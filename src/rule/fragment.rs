//! Atomic rule fragments and dialect detection.

use regex::Regex;

use crate::error::{Error, Result};
use crate::patterns::{JS_BLOCK, PUT_RULE, XPATH_PREFIX};

/// Query language a fragment is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Selector with an `@extractor` suffix, e.g. `.title a@href`.
    Default,
    /// Same syntax as `Default`, selected explicitly with `@css:`.
    Css,
    /// `@XPath:` prefix or a leading `/`.
    XPath,
    /// `@json:` prefix or a leading `$.` / `$[`.
    JsonPath,
    /// Leading `:`.
    Regex,
    /// `@js:` prefix or a `<js>...</js>` wrapper.
    Script,
}

/// How a fragment attaches to the fragment before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    /// First fragment of the chain.
    First,
    /// `||`: tried only when everything before it came out empty.
    Or,
    /// `&&`: always evaluated together with the preceding fragment.
    And,
}

/// Regex replacement applied to a fragment's result (`##pattern##replacement`).
///
/// The pattern is compiled when the rule is resolved. Equality compares the
/// source text only.
#[derive(Debug, Clone)]
pub struct Replacement {
    pattern: String,
    replacement: String,
    first_only: bool,
    regex: Regex,
}

impl Replacement {
    /// Compiles `pattern`; a malformed pattern is an invalid rule.
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        first_only: bool,
    ) -> Result<Self> {
        let pattern = pattern.into();
        let regex =
            Regex::new(&pattern).map_err(|e| Error::invalid_rule(&pattern, e.to_string()))?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
            first_only,
            regex,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Trailing `###`: replace the first match only.
    #[must_use]
    pub fn first_only(&self) -> bool {
        self.first_only
    }

    /// Applies the replacement to `value`. `$1`-style group references expand.
    #[must_use]
    pub fn apply(&self, value: &str) -> String {
        let replaced = if self.first_only {
            self.regex.replace(value, self.replacement.as_str())
        } else {
            self.regex.replace_all(value, self.replacement.as_str())
        };
        replaced.into_owned()
    }
}

impl PartialEq for Replacement {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.replacement == other.replacement
            && self.first_only == other.first_only
    }
}

impl Eq for Replacement {}

/// One atomic, dialect-tagged piece of a [`RuleChain`](super::RuleChain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFragment {
    pub dialect: Dialect,
    /// Rule text with dialect prefix, `@put` segments and `##` suffix removed.
    pub text: String,
    pub link: Link,
    /// `@put` assignments `(variable, rule)` run before the fragment itself.
    pub puts: Vec<(String, String)>,
    pub replace: Option<Replacement>,
}

impl RuleFragment {
    /// Joined with `&&`: evaluated regardless of the preceding result.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.link == Link::And
    }

    /// Joined with `||`: only reached when the preceding alternative was empty.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.link == Link::Or
    }

    /// Runs the `##` replacement, if any, over an evaluated value.
    #[must_use]
    pub fn post_process(&self, value: String) -> String {
        match &self.replace {
            Some(replace) if !value.is_empty() => replace.apply(&value),
            _ => value,
        }
    }
}

/// Parses one piece of a split rule expression.
///
/// Returns `None` for pieces that carry neither rule text nor `@put`s.
pub(crate) fn parse_fragment(raw: &str, link: Link) -> Result<Option<RuleFragment>> {
    let mut puts = Vec::new();
    for caps in PUT_RULE.captures_iter(raw) {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&caps[1])
            .map_err(|e| Error::invalid_rule(raw, format!("bad @put object: {e}")))?;
        for (key, value) in map {
            let serde_json::Value::String(rule) = value else {
                return Err(Error::invalid_rule(raw, format!("@put value for `{key}` is not a string")));
            };
            puts.push((key, rule));
        }
    }
    let without_puts = PUT_RULE.replace_all(raw, "");
    let trimmed = without_puts.trim();

    let (dialect, body) = detect_dialect(trimmed);

    // Scripts own the whole body; `##` belongs to the script source.
    let (text, replace) = if dialect == Dialect::Script {
        (body.to_string(), None)
    } else {
        split_replacement(body)?
    };

    if text.is_empty() && puts.is_empty() {
        return Ok(None);
    }

    Ok(Some(RuleFragment {
        dialect,
        text,
        link,
        puts,
        replace,
    }))
}

/// Detects the dialect and strips its prefix.
fn detect_dialect(text: &str) -> (Dialect, &str) {
    if let Some(rest) = strip_prefix_ignore_case(text, "@css:") {
        return (Dialect::Css, rest.trim_start());
    }
    if let Some(m) = XPATH_PREFIX.find(text) {
        return (Dialect::XPath, text[m.end()..].trim_start());
    }
    if let Some(rest) = strip_prefix_ignore_case(text, "@json:") {
        return (Dialect::JsonPath, rest.trim_start());
    }
    if let Some(rest) = strip_prefix_ignore_case(text, "@js:") {
        return (Dialect::Script, rest.trim());
    }
    if let Some(caps) = JS_BLOCK.captures(text) {
        let body = caps.get(1).map_or("", |m| m.as_str());
        return (Dialect::Script, body.trim());
    }
    if text.starts_with('/') {
        return (Dialect::XPath, text);
    }
    if text.starts_with("$.") || text.starts_with("$[") {
        return (Dialect::JsonPath, text);
    }
    if let Some(rest) = text.strip_prefix(':') {
        return (Dialect::Regex, rest);
    }
    (Dialect::Default, text)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

/// Splits `rule##pattern##replacement###` into its parts.
fn split_replacement(body: &str) -> Result<(String, Option<Replacement>)> {
    let Some((rule, tail)) = body.split_once("##") else {
        return Ok((body.trim().to_string(), None));
    };

    let (tail, first_only) = match tail.strip_suffix("###") {
        Some(stripped) => (stripped, true),
        None => (tail, false),
    };
    let (pattern, replacement) = tail.split_once("##").unwrap_or((tail, ""));

    let replace = if pattern.is_empty() {
        None
    } else {
        Some(Replacement::new(pattern, replacement, first_only)?)
    };
    Ok((rule.trim().to_string(), replace))
}
