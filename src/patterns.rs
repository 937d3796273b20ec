//! Compiled regex patterns for rule parsing and field cleanup.
//!
//! All patterns are compiled once using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Rule Syntax
// =============================================================================

/// `@put:{...}` segment inside a rule fragment. Capture 1 is the JSON object.
pub static PUT_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@put:(\{[^{}]*\})").expect("PUT_RULE regex")
});

/// `@get:{key}` reference inside a rule fragment. Capture 1 is the key.
pub static GET_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@get:\{([^{}]+)\}").expect("GET_VARIABLE regex")
});

/// Fully wrapped script fragment `<js>...</js>`. Capture 1 is the body.
pub static JS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^<js>(.*)</js>$").expect("JS_BLOCK regex")
});

/// XPath dialect prefix.
pub static XPATH_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^@xpath:").expect("XPATH_PREFIX regex")
});

// =============================================================================
// Field Cleanup
// =============================================================================

/// Leading author label such as `作者：` or `Author:`.
pub static AUTHOR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:作\s*者\s*[:：]?|(?:author|by)(?:\s*[:：]|\s))\s*")
        .expect("AUTHOR_PREFIX regex")
});

/// Trailing `作品集` / `著` decorations after an author name.
pub static AUTHOR_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:作品集.*|\s著)\s*$").expect("AUTHOR_SUFFIX regex")
});

/// Runs of whitespace, including full-width and non-breaking spaces.
pub static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE regex")
});
