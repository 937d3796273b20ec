//! Reference [`ContentQuery`] backend over `dom_query` and `serde_json`.

use std::borrow::Cow;

use regex::Regex;
use serde_json::Value;

use crate::dom::{self, Document, NodeId, NodeRef, Selection};
use crate::error::{Error, Result};
use crate::result::Variables;
use crate::rule::{Dialect, RuleChain, RuleFragment};

use super::json_path::{values_to_strings, JsonPath};
use super::{apply_puts, substitute_with, ContentQuery};

/// Node handle returned by [`DomQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    /// Element of the bound HTML page.
    Element(NodeId),
    /// Value from the bound JSON page.
    Json(Value),
    /// Free-standing markup or text, e.g. a regex match. Parsed when bound.
    Text(String),
}

/// Parsed page content.
enum Content {
    Html(Document),
    Json(Value),
}

impl Content {
    /// JSON when the body starts like JSON and parses, HTML otherwise.
    fn parse(body: &str) -> Self {
        let head = body.trim_start();
        if head.starts_with('{') || head.starts_with('[') {
            if let Ok(value) = serde_json::from_str(head) {
                return Self::Json(value);
            }
        }
        Self::Html(dom::parse(body))
    }
}

/// Where queries currently evaluate.
enum Scope {
    Page,
    Element(NodeId),
    Owned(Content),
}

/// What a fragment is evaluated against.
enum Target<'a> {
    /// Element ids are only handed out for the page document.
    Html { sel: Selection<'a>, on_page: bool },
    Json(&'a Value),
}

/// Bundled content-query backend for HTML and JSON pages.
///
/// Default and `@css:` fragments take the form `selector@extractor`, where the
/// extractor is `text`, `textNodes`, `ownText`, `html`, `all` or an attribute
/// name. JSON pages are queried with JSONPath; plain fragments on a JSON page
/// are read as paths too. XPath and script fragments are not supported.
///
/// # Example
///
/// ```rust
/// use rs_booklist::query::{ContentQuery, DomQuery};
/// use rs_booklist::rule::resolve;
/// use rs_booklist::Variables;
///
/// let mut query = DomQuery::new();
/// query.bind(r#"<h1 class="t">Dune</h1>"#, "https://x.com/")?;
///
/// let mut vars = Variables::new();
/// let name = query.query_string(&resolve(".missing@text||h1.t@text")?, false, &mut vars)?;
/// assert_eq!(name, "Dune");
/// # Ok::<(), rs_booklist::Error>(())
/// ```
pub struct DomQuery {
    base_url: String,
    page: Option<Content>,
    scope: Scope,
}

impl Default for DomQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl DomQuery {
    /// A backend with nothing bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
            page: None,
            scope: Scope::Page,
        }
    }

    /// URL of the currently bound page.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn target(&self) -> Result<Target<'_>> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| Error::Query("no content bound".into()))?;

        let target = match (&self.scope, page) {
            (Scope::Page, Content::Html(doc)) => Target::Html {
                sel: dom::document_root(doc),
                on_page: true,
            },
            (Scope::Page, Content::Json(value)) | (Scope::Owned(Content::Json(value)), _) => {
                Target::Json(value)
            }
            (Scope::Element(id), Content::Html(doc)) => Target::Html {
                sel: dom::node_selection(doc, *id)
                    .ok_or_else(|| Error::Query("bound node no longer exists".into()))?,
                on_page: true,
            },
            (Scope::Element(_), Content::Json(_)) => {
                return Err(Error::Query("element node bound to a json page".into()));
            }
            (Scope::Owned(Content::Html(doc)), _) => Target::Html {
                sel: dom::document_root(doc),
                on_page: false,
            },
        };
        Ok(target)
    }

    /// Expands `@get:{key}`; `baseUrl` falls back to the bound page URL.
    fn expand<'t>(&self, text: &'t str, vars: &Variables) -> Cow<'t, str> {
        substitute_with(text, |key| match vars.get(key) {
            Some(value) => Some(value),
            None if key == "baseUrl" => Some(self.base_url.as_str()),
            None => None,
        })
    }

    /// String values of one fragment, empties removed.
    fn fragment_values(&self, fragment: &RuleFragment, vars: &Variables) -> Result<Vec<String>> {
        if fragment.text.is_empty() {
            return Ok(Vec::new());
        }
        let text = self.expand(&fragment.text, vars);
        let values = match (fragment.dialect, self.target()?) {
            (Dialect::XPath | Dialect::Script, _) => {
                return Err(Error::UnsupportedDialect(fragment.dialect));
            }
            (Dialect::Regex, target) => regex_matches(&text, &haystack(&target))?,
            (Dialect::JsonPath | Dialect::Default, Target::Json(value)) => {
                values_to_strings(&JsonPath::parse(&text)?.select(value))
            }
            (Dialect::JsonPath, Target::Html { .. }) => {
                return Err(Error::invalid_rule(text, "json path rule on html content"));
            }
            (Dialect::Css, Target::Json(_)) => {
                return Err(Error::invalid_rule(text, "css rule on json content"));
            }
            (Dialect::Default | Dialect::Css, Target::Html { sel, .. }) => {
                if text.contains("<js>") || text.contains("@js:") {
                    return Err(Error::UnsupportedDialect(Dialect::Script));
                }
                let (selector, extractor) = split_extractor(&text);
                let selected = select(&sel, selector)?;
                selected
                    .nodes()
                    .iter()
                    .map(|node| extract(node, extractor))
                    .collect()
            }
        };
        Ok(values.into_iter().filter(|v| !v.is_empty()).collect())
    }

    /// Nodes matched by one fragment.
    fn fragment_nodes(&self, fragment: &RuleFragment, vars: &Variables) -> Result<Vec<DomNode>> {
        if fragment.text.is_empty() {
            return Ok(Vec::new());
        }
        let text = self.expand(&fragment.text, vars);
        let nodes = match (fragment.dialect, self.target()?) {
            (Dialect::XPath | Dialect::Script, _) => {
                return Err(Error::UnsupportedDialect(fragment.dialect));
            }
            (Dialect::Regex, target) => regex_matches(&text, &haystack(&target))?
                .into_iter()
                .map(DomNode::Text)
                .collect(),
            (Dialect::JsonPath | Dialect::Default, Target::Json(value)) => {
                let selected = JsonPath::parse(&text)?.select(value);
                match selected.as_slice() {
                    [Value::Array(items)] => items.iter().cloned().map(DomNode::Json).collect(),
                    _ => selected.iter().map(|v| DomNode::Json((*v).clone())).collect(),
                }
            }
            (Dialect::JsonPath, Target::Html { .. }) => {
                return Err(Error::invalid_rule(text, "json path rule on html content"));
            }
            (Dialect::Css, Target::Json(_)) => {
                return Err(Error::invalid_rule(text, "css rule on json content"));
            }
            (Dialect::Default | Dialect::Css, Target::Html { sel, on_page }) => {
                let selected = select(&sel, &text)?;
                if on_page {
                    dom::node_ids(&selected).into_iter().map(DomNode::Element).collect()
                } else {
                    selected
                        .nodes()
                        .iter()
                        .map(|node| DomNode::Text(dom::outer_html(&Selection::from(*node))))
                        .collect()
                }
            }
        };
        Ok(nodes)
    }
}

impl ContentQuery for DomQuery {
    type Node = DomNode;

    fn bind(&mut self, body: &str, base_url: &str) -> Result<()> {
        self.base_url = base_url.to_string();
        self.page = Some(Content::parse(body));
        self.scope = Scope::Page;
        Ok(())
    }

    fn bind_node(&mut self, node: &DomNode) -> Result<()> {
        self.scope = match node {
            DomNode::Element(id) => Scope::Element(*id),
            DomNode::Json(value) => Scope::Owned(Content::Json(value.clone())),
            DomNode::Text(text) => Scope::Owned(Content::parse(text)),
        };
        Ok(())
    }

    fn query_nodes(&mut self, rule: &RuleChain, vars: &mut Variables) -> Result<Vec<DomNode>> {
        for alternative in rule.alternatives() {
            let mut nodes = Vec::new();
            for fragment in alternative {
                apply_puts(&mut *self, fragment, vars)?;
                nodes.extend(self.fragment_nodes(fragment, vars)?);
            }
            if !nodes.is_empty() {
                return Ok(nodes);
            }
        }
        Ok(Vec::new())
    }

    fn query_string(
        &mut self,
        rule: &RuleChain,
        is_url: bool,
        vars: &mut Variables,
    ) -> Result<String> {
        rule.evaluate(|fragment| {
            apply_puts(&mut *self, fragment, vars)?;
            let values = self.fragment_values(fragment, vars)?;
            Ok(match (is_url, fragment.dialect) {
                (true, _) => values.first().map(|v| clean_url(v)).unwrap_or_default(),
                // A regex string read is its first match; list reads keep every match.
                (false, Dialect::Regex) => values.into_iter().next().unwrap_or_default(),
                (false, _) => values.join("\n"),
            })
        })
    }

    fn query_string_list(&mut self, rule: &RuleChain, vars: &mut Variables) -> Result<Vec<String>> {
        rule.evaluate_list(|fragment| {
            apply_puts(&mut *self, fragment, vars)?;
            self.fragment_values(fragment, vars)
        })
    }
}

/// `selector@extractor`; no `@` means the text of the selector's matches.
fn split_extractor(text: &str) -> (&str, &str) {
    match text.rsplit_once('@') {
        Some((selector, extractor)) => (selector.trim(), extractor.trim()),
        None => (text.trim(), "text"),
    }
}

/// Descendants of `sel` matching `selector`; an empty selector is `sel` itself.
fn select<'a>(sel: &Selection<'a>, selector: &str) -> Result<Selection<'a>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Ok(sel.clone());
    }
    let matcher = dom::compile_selector(selector)?;
    Ok(sel.select_matcher(&matcher))
}

fn extract(node: &NodeRef, extractor: &str) -> String {
    let sel = Selection::from(*node);
    match extractor {
        "" | "text" => dom::text_content(&sel),
        "textNodes" => dom::own_text(node).join("\n"),
        "ownText" => dom::own_text(node).join(""),
        "html" | "all" => dom::outer_html(&sel),
        attr => dom::get_attribute(&sel, attr).unwrap_or_default(),
    }
}

/// Markup (or serialized JSON) a regex fragment searches.
fn haystack(target: &Target<'_>) -> String {
    match target {
        Target::Html { sel, .. } => dom::outer_html(sel),
        Target::Json(value) => value.to_string(),
    }
}

/// Capture 1 of every match, or the whole match when the pattern has no group.
fn regex_matches(pattern: &str, haystack: &str) -> Result<Vec<String>> {
    let regex = Regex::new(pattern).map_err(|e| Error::invalid_rule(pattern, e.to_string()))?;
    Ok(regex
        .captures_iter(haystack)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str().to_string())
        .collect())
}

fn clean_url(raw: &str) -> String {
    raw.trim().replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::resolve;

    const LIST_HTML: &str = r#"
        <html><body>
            <ul id="list">
                <li class="book">
                    <h3><a href="/book/1?a=1&amp;b=2">Dune</a></h3>
                    <span class="author">Frank Herbert</span>
                    <div class="tags"><i>sf</i><i>classic</i></div>
                    <img src="/c/1.jpg">
                </li>
                <li class="book">
                    <h3><a href="/book/2">Emma</a></h3>
                    <span class="author">Jane Austen</span>
                </li>
            </ul>
            <p class="note">head<b>bold</b>tail</p>
        </body></html>
    "#;

    fn bound(body: &str) -> DomQuery {
        let mut query = DomQuery::new();
        query.bind(body, "https://books.example/search").unwrap();
        query
    }

    fn string(query: &mut DomQuery, rule: &str) -> String {
        query
            .query_string(&resolve(rule).unwrap(), false, &mut Variables::new())
            .unwrap()
    }

    #[test]
    fn test_query_nodes_and_bind_node() {
        let mut query = bound(LIST_HTML);
        let mut vars = Variables::new();
        let nodes = query.query_nodes(&resolve("li.book").unwrap(), &mut vars).unwrap();
        assert_eq!(nodes.len(), 2);

        query.bind_node(&nodes[1]).unwrap();
        assert_eq!(string(&mut query, "h3 a@text"), "Emma");
        assert_eq!(string(&mut query, ".author@text"), "Jane Austen");
    }

    #[test]
    fn test_extractors() {
        let mut query = bound(LIST_HTML);
        assert_eq!(string(&mut query, "p.note@ownText"), "headtail");
        assert_eq!(string(&mut query, "p.note@textNodes"), "head\ntail");
        assert_eq!(string(&mut query, "p.note"), "headboldtail");
        assert!(string(&mut query, "p.note@html").starts_with("<p class=\"note\">"));
    }

    #[test]
    fn test_url_query_takes_first_and_decodes() {
        let mut query = bound(LIST_HTML);
        let url = query
            .query_string(&resolve("h3 a@href").unwrap(), true, &mut Variables::new())
            .unwrap();
        assert_eq!(url, "/book/1?a=1&b=2");
    }

    #[test]
    fn test_string_list() {
        let mut query = bound(LIST_HTML);
        let tags = query
            .query_string_list(&resolve(".tags i@text").unwrap(), &mut Variables::new())
            .unwrap();
        assert_eq!(tags, vec!["sf", "classic"]);
    }

    #[test]
    fn test_put_and_get_variables() {
        let mut query = bound(LIST_HTML);
        let mut vars = Variables::new();
        let rule = resolve(r#"@put:{"first":"li.book h3 a@text"}"#).unwrap();
        assert_eq!(query.query_string(&rule, false, &mut vars).unwrap(), "");
        assert_eq!(vars.get("first"), Some("Dune\nEmma"));

        vars.put("cls", "author");
        let author = query
            .query_string(&resolve("li.book .@get:{cls}@text").unwrap(), false, &mut vars)
            .unwrap();
        assert_eq!(author, "Frank Herbert\nJane Austen");
    }

    #[test]
    fn test_regex_fragments() {
        let mut query = bound(LIST_HTML);
        assert_eq!(string(&mut query, r#":href="(/book/\d+)"#), "/book/1");
        let all = query
            .query_string_list(&resolve(r#":href="(/book/\d+)"#).unwrap(), &mut Variables::new())
            .unwrap();
        assert_eq!(all, vec!["/book/1", "/book/2"]);
        let mut vars = Variables::new();
        let nodes = query
            .query_nodes(&resolve(r#":<li class="book">[\s\S]*?</li>"#).unwrap(), &mut vars)
            .unwrap();
        assert_eq!(nodes.len(), 2);
        query.bind_node(&nodes[0]).unwrap();
        assert_eq!(string(&mut query, "a@text"), "Dune");
    }

    #[test]
    fn test_json_page() {
        let body = r#"{"data":{"list":[{"title":"Dune","tags":["sf","classic"]},{"title":"Emma"}]}}"#;
        let mut query = bound(body);
        let mut vars = Variables::new();
        let nodes = query.query_nodes(&resolve("$.data.list").unwrap(), &mut vars).unwrap();
        assert_eq!(nodes.len(), 2);

        query.bind_node(&nodes[0]).unwrap();
        assert_eq!(string(&mut query, "$.title"), "Dune");
        assert_eq!(string(&mut query, "title"), "Dune");
        assert_eq!(string(&mut query, "$.tags"), "sf\nclassic");
    }

    #[test]
    fn test_unsupported_dialects() {
        let mut query = bound(LIST_HTML);
        let err = query
            .query_string(&resolve("//li/a/@href").unwrap(), false, &mut Variables::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDialect(Dialect::XPath)));

        let err = query
            .query_string(&resolve("@js:result").unwrap(), false, &mut Variables::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDialect(Dialect::Script)));
    }

    #[test]
    fn test_dialect_mismatch_is_invalid_rule() {
        let mut query = bound(LIST_HTML);
        let err = query
            .query_string(&resolve("$.data").unwrap(), false, &mut Variables::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRule { .. }));
    }

    #[test]
    fn test_unbound_backend_fails() {
        let mut query = DomQuery::new();
        let err = query
            .query_string(&resolve("a@text").unwrap(), false, &mut Variables::new())
            .unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn test_bind_replaces_previous_binding() {
        let mut query = bound(LIST_HTML);
        let nodes = query.query_nodes(&resolve("li.book").unwrap(), &mut Variables::new()).unwrap();
        query.bind_node(&nodes[0]).unwrap();
        query.bind("<h1>Fresh</h1>", "https://other.example/").unwrap();
        assert_eq!(string(&mut query, "h1@text"), "Fresh");
        assert_eq!(query.base_url(), "https://other.example/");
    }
}
