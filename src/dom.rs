//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate used by the bundled query backend:
//! parsing, selector compilation, node lookup by id and value extraction.

pub use dom_query::{Document, Matcher, NodeId, NodeRef, Selection};

use crate::error::{Error, Result};
use crate::patterns::WHITESPACE;

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Compile a CSS selector, reporting syntax errors as invalid rules.
pub fn compile_selector(selector: &str) -> Result<Matcher> {
    Matcher::new(selector).map_err(|e| Error::invalid_rule(selector, format!("{e:?}")))
}

// === Node Lookup ===

/// The `<html>` root of a parsed document.
#[inline]
#[must_use]
pub fn document_root(doc: &Document) -> Selection<'_> {
    doc.select("html")
}

/// Re-select a node of `doc` by id.
#[must_use]
pub fn node_selection(doc: &Document, id: NodeId) -> Option<Selection<'_>> {
    doc.tree.get(&id).map(Selection::from)
}

/// Ids of every node in a selection, in document order.
#[must_use]
pub fn node_ids(sel: &Selection) -> Vec<NodeId> {
    sel.nodes().iter().map(|node| node.id).collect()
}

// === Values ===

/// Text content with whitespace runs collapsed, trimmed.
#[must_use]
pub fn text_content(sel: &Selection) -> String {
    WHITESPACE.replace_all(sel.text().trim(), " ").into_owned()
}

/// Outer HTML of the selection.
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> String {
    sel.html().to_string()
}

/// Get any attribute value, trimmed
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.trim().to_string())
}

/// Text of the node's direct text children, each trimmed, empties dropped.
#[must_use]
pub fn own_text(node: &NodeRef) -> Vec<String> {
    node.children()
        .into_iter()
        .filter(NodeRef::is_text)
        .map(|child| child.text().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_selection_round_trips_ids() {
        let doc = parse(r#"<ul><li>one</li><li>two</li></ul>"#);
        let ids = node_ids(&doc.select("li"));
        assert_eq!(ids.len(), 2);

        let second = node_selection(&doc, ids[1]).unwrap();
        assert_eq!(text_content(&second), "two");
    }

    #[test]
    fn test_text_content_collapses_whitespace() {
        let doc = parse("<p>  a \n\n  b  </p>");
        assert_eq!(text_content(&doc.select("p")), "a b");
    }

    #[test]
    fn test_own_text_skips_children() {
        let doc = parse("<div>head<span>inner</span> tail </div>");
        let div = doc.select("div");
        let node = div.nodes()[0];
        assert_eq!(own_text(&node), vec!["head", "tail"]);
    }

    #[test]
    fn test_get_attribute_trims() {
        let doc = parse(r#"<a href=" /book/1 ">x</a>"#);
        assert_eq!(get_attribute(&doc.select("a"), "href").as_deref(), Some("/book/1"));
        assert!(get_attribute(&doc.select("a"), "title").is_none());
    }

    #[test]
    fn test_compile_selector_rejects_garbage() {
        assert!(compile_selector("div > .ok").is_ok());
        assert!(matches!(compile_selector("div >>> ["), Err(Error::InvalidRule { .. })));
    }
}
