//! Minimal JSONPath evaluation for JSON pages.
//!
//! Supported: `$`, `.key`, `['key']`, `[n]` (negative counts from the end),
//! `[*]`, `.*` and recursive `..key`.

use serde_json::Value;

use crate::error::{Error, Result};

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(i64),
    Wildcard,
    /// `..key`: every value stored under `key` at any depth.
    Descendant(String),
}

/// A parsed JSONPath expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parses a path. A missing leading `$` is assumed.
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.trim();
        let rest = path.strip_prefix('$').unwrap_or(path);
        let bytes = rest.as_bytes();
        let mut segments = Vec::new();
        let mut i = 0;

        let bad = |reason: &str| Error::invalid_rule(path, reason.to_string());

        while i < bytes.len() {
            match bytes[i] {
                b'.' if bytes.get(i + 1) == Some(&b'.') => {
                    let (key, next) = read_key(rest, i + 2);
                    if key.is_empty() {
                        return Err(bad("empty key after `..`"));
                    }
                    segments.push(Segment::Descendant(key.to_string()));
                    i = next;
                }
                b'.' => {
                    if bytes.get(i + 1) == Some(&b'*') {
                        segments.push(Segment::Wildcard);
                        i += 2;
                        continue;
                    }
                    let (key, next) = read_key(rest, i + 1);
                    if key.is_empty() {
                        return Err(bad("empty key after `.`"));
                    }
                    segments.push(Segment::Key(key.to_string()));
                    i = next;
                }
                b'[' => {
                    let close = rest[i..].find(']').ok_or_else(|| bad("unclosed `[`"))? + i;
                    let inner = rest[i + 1..close].trim();
                    segments.push(parse_bracket(inner).ok_or_else(|| bad("bad bracket segment"))?);
                    i = close + 1;
                }
                _ if i == 0 => {
                    // Bare `key.sub` without `$.`
                    let (key, next) = read_key(rest, 0);
                    segments.push(Segment::Key(key.to_string()));
                    i = next;
                }
                _ => return Err(bad("unexpected character")),
            }
        }

        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Evaluates the path, returning matched values in document order.
    #[must_use]
    pub fn select<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                match segment {
                    Segment::Key(key) => {
                        if let Some(child) = value.get(key.as_str()) {
                            next.push(child);
                        }
                    }
                    Segment::Index(index) => {
                        if let Value::Array(items) = value {
                            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                            let at = if *index < 0 { len + index } else { *index };
                            if let Some(item) = usize::try_from(at).ok().and_then(|at| items.get(at)) {
                                next.push(item);
                            }
                        }
                    }
                    Segment::Wildcard => match value {
                        Value::Array(items) => next.extend(items.iter()),
                        Value::Object(map) => next.extend(map.values()),
                        _ => {}
                    },
                    Segment::Descendant(key) => collect_descendants(value, key, &mut next),
                }
            }
            current = next;
        }
        current
    }
}

fn read_key(rest: &str, start: usize) -> (&str, usize) {
    let end = rest[start..]
        .find(&['.', '['][..])
        .map_or(rest.len(), |offset| start + offset);
    (&rest[start..end], end)
}

fn parse_bracket(inner: &str) -> Option<Segment> {
    if inner == "*" {
        return Some(Segment::Wildcard);
    }
    if let Ok(index) = inner.parse::<i64>() {
        return Some(Segment::Index(index));
    }
    let quoted = inner
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))?;
    Some(Segment::Key(quoted.to_string()))
}

fn collect_descendants<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, child) in map {
                if k == key {
                    out.push(child);
                }
                collect_descendants(child, key, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_descendants(item, key, out);
            }
        }
        _ => {}
    }
}

/// Flattens matched values into strings: scalars as text, arrays item by
/// item, objects as compact JSON. `null` is skipped.
pub(crate) fn values_to_strings(values: &[&Value]) -> Vec<String> {
    let mut out = Vec::new();
    for value in values {
        match value {
            Value::Null => {}
            Value::String(s) => out.push(s.clone()),
            Value::Array(items) => {
                let refs: Vec<&Value> = items.iter().collect();
                out.extend(values_to_strings(&refs));
            }
            other => out.push(other.to_string()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "data": {
                "books": [
                    {"name": "Dune", "tags": ["sf", "classic"], "id": 1},
                    {"name": "Emma", "tags": [], "id": 2}
                ],
                "total": 2
            }
        })
    }

    #[test]
    fn test_parse_segments() {
        let path = JsonPath::parse("$.data.books[0]['name']").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("data".into()),
                Segment::Key("books".into()),
                Segment::Index(0),
                Segment::Key("name".into()),
            ]
        );
    }

    #[test]
    fn test_select_wildcard_and_index() {
        let doc = sample();
        let names = JsonPath::parse("$.data.books[*].name").unwrap();
        assert_eq!(names.select(&doc), vec![&json!("Dune"), &json!("Emma")]);

        let last = JsonPath::parse("$.data.books[-1].id").unwrap();
        assert_eq!(last.select(&doc), vec![&json!(2)]);
    }

    #[test]
    fn test_select_descendant() {
        let doc = sample();
        let path = JsonPath::parse("$..name").unwrap();
        assert_eq!(path.select(&doc).len(), 2);
    }

    #[test]
    fn test_bare_key_path() {
        let doc = sample();
        let path = JsonPath::parse("data.total").unwrap();
        assert_eq!(path.select(&doc), vec![&json!(2)]);
    }

    #[test]
    fn test_missing_key_selects_nothing() {
        let doc = sample();
        assert!(JsonPath::parse("$.nope.deeper").unwrap().select(&doc).is_empty());
    }

    #[test]
    fn test_invalid_paths() {
        assert!(JsonPath::parse("$.a[").is_err());
        assert!(JsonPath::parse("$.a[x]").is_err());
        assert!(JsonPath::parse("$..").is_err());
    }

    #[test]
    fn test_values_to_strings() {
        let doc = sample();
        let tags = JsonPath::parse("$.data.books[0].tags").unwrap();
        assert_eq!(values_to_strings(&tags.select(&doc)), vec!["sf", "classic"]);

        let id = JsonPath::parse("$.data.books[0].id").unwrap();
        assert_eq!(values_to_strings(&id.select(&doc)), vec!["1"]);
    }
}
