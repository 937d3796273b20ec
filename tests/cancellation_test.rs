//! Cancellation checkpoints, driven through a scripted backend.

#![allow(clippy::expect_used)]

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rs_booklist::{
    analyze, analyze_book_list, ContentQuery, Error, Liveness, NeverCancel, Options, Result,
    RuleChain, SourceConfig, Variables,
};

/// Serves `nodes` list items named "Book {i}" and raises `cancel` when
/// node `cancel_at` is bound.
struct ScriptedQuery<'a> {
    nodes: usize,
    cancel_at: Option<usize>,
    cancel: &'a AtomicBool,
    bound: Option<usize>,
    binds: usize,
    reads: usize,
}

impl<'a> ScriptedQuery<'a> {
    fn new(nodes: usize, cancel_at: Option<usize>, cancel: &'a AtomicBool) -> Self {
        Self {
            nodes,
            cancel_at,
            cancel,
            bound: None,
            binds: 0,
            reads: 0,
        }
    }
}

impl ContentQuery for ScriptedQuery<'_> {
    type Node = usize;

    fn bind(&mut self, _body: &str, _base_url: &str) -> Result<()> {
        self.bound = None;
        Ok(())
    }

    fn bind_node(&mut self, node: &usize) -> Result<()> {
        self.bound = Some(*node);
        self.binds += 1;
        if self.cancel_at == Some(*node) {
            self.cancel.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn query_nodes(&mut self, _rule: &RuleChain, _vars: &mut Variables) -> Result<Vec<usize>> {
        Ok((0..self.nodes).collect())
    }

    fn query_string(&mut self, rule: &RuleChain, _is_url: bool, _vars: &mut Variables) -> Result<String> {
        self.reads += 1;
        Ok(match (rule.is_empty(), self.bound) {
            (false, Some(i)) => format!("Book {i}"),
            _ => String::new(),
        })
    }

    fn query_string_list(&mut self, _rule: &RuleChain, _vars: &mut Variables) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

fn source() -> SourceConfig {
    SourceConfig::from_json(r#"{"bookSourceUrl":"s","ruleSearch":{"bookList":"li","name":"b"}}"#)
        .expect("source json should parse")
}

#[test]
fn test_scripted_backend_runs_to_completion() {
    let flag = AtomicBool::new(false);
    let mut query = ScriptedQuery::new(5, None, &flag);
    let books = analyze_book_list(&mut query, Some("body"), &source(), "u", true, &flag, &Options::default())
        .expect("expected Ok(_)");
    let names: Vec<&str> = books.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Book 0", "Book 1", "Book 2", "Book 3", "Book 4"]);
}

#[test]
fn test_cancel_mid_list_discards_records() {
    let flag = AtomicBool::new(false);
    let mut query = ScriptedQuery::new(5, Some(2), &flag);
    let result = analyze_book_list(&mut query, Some("body"), &source(), "u", true, &flag, &Options::default());

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(query.binds, 3, "nodes after the cancelled one are never bound");
}

#[test]
fn test_cancel_is_checked_before_field_reads() {
    let flag = AtomicBool::new(false);
    let mut query = ScriptedQuery::new(1, Some(0), &flag);
    let result = analyze_book_list(&mut query, Some("body"), &source(), "u", true, &flag, &Options::default());

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(query.reads, 0, "no field is read once the signal is set");
}

#[test]
fn test_cancel_before_entry() {
    let flag = AtomicBool::new(true);
    let mut query = ScriptedQuery::new(5, None, &flag);
    let result = analyze_book_list(&mut query, Some("body"), &source(), "u", true, &flag, &Options::default());

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(query.binds, 0);
}

#[test]
fn test_missing_body_wins_over_cancellation() {
    let flag = AtomicBool::new(true);
    let result = analyze(None, &source(), "u", true, &flag);
    assert!(matches!(result, Err(Error::ContentMissing { .. })));
}

#[test]
fn test_liveness_predicate() {
    let html = "<ul><li><b>Dune</b></li></ul>";

    let dead = Liveness(|| false);
    assert!(matches!(analyze(Some(html), &source(), "u", true, &dead), Err(Error::Cancelled)));

    let alive = Liveness(|| true);
    let books = analyze(Some(html), &source(), "u", true, &alive).expect("expected Ok(_)");
    assert_eq!(books.len(), 1);
}

#[test]
fn test_shared_flag_across_threads() {
    let flag = Arc::new(AtomicBool::new(false));
    let html = "<ul><li><b>Dune</b></li></ul>";

    let worker_flag = Arc::clone(&flag);
    let handle = std::thread::spawn(move || analyze(Some(html), &source(), "u", true, &worker_flag));
    let books = handle.join().expect("worker panicked").expect("expected Ok(_)");
    assert_eq!(books.len(), 1);

    flag.store(true, Ordering::SeqCst);
    assert!(matches!(analyze(Some(html), &source(), "u", true, &flag), Err(Error::Cancelled)));
}

#[test]
fn test_never_cancel() {
    let html = "<ul><li><b>Dune</b></li><li><b>Emma</b></li></ul>";
    let books = analyze(Some(html), &source(), "u", true, &NeverCancel).expect("expected Ok(_)");
    assert_eq!(books.len(), 2);
}

const DETAIL_HTML: &str = r#"<html><body><div class="info"><h1>Dune</h1><p class="author">Frank Herbert</p></div></body></html>"#;

fn detail_source(pattern: Option<&str>, init: Option<&str>) -> SourceConfig {
    let mut source = source();
    source.book_url_pattern = pattern.map(str::to_string);
    source.info_profile.init = init.map(str::to_string);
    source.info_profile.name = Some("h1@text".to_string());
    source.info_profile.author = Some(".author@text".to_string());
    source
}

/// Alive for the first `polls` checks, cancelled from then on.
fn alive_for(polls: usize) -> Liveness<impl Fn() -> bool> {
    let seen = Cell::new(0usize);
    Liveness(move || {
        seen.set(seen.get() + 1);
        seen.get() <= polls
    })
}

#[test]
fn test_detail_pattern_page_completes_when_alive() {
    let source = detail_source(Some(r"https://x\.com/book/\d+"), None);
    let books = analyze(Some(DETAIL_HTML), &source, "https://x.com/book/1", true, &alive_for(usize::MAX))
        .expect("expected Ok(_)");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].author, "Frank Herbert");
}

#[test]
fn test_cancel_between_detail_fields_on_pattern_page() {
    let source = detail_source(Some(r"https://x\.com/book/\d+"), None);
    // Entry and the name read pass; the author read sees the signal.
    let result = analyze(Some(DETAIL_HTML), &source, "https://x.com/book/1", true, &alive_for(2));
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn test_cancel_between_detail_fields_on_empty_list_fallback() {
    let source = detail_source(None, None);
    let books = analyze(Some(DETAIL_HTML), &source, "https://x.com/book/1", true, &alive_for(usize::MAX))
        .expect("expected Ok(_)");
    assert_eq!(books.len(), 1, "no list nodes, so the page is read as one book");

    let result = analyze(Some(DETAIL_HTML), &source, "https://x.com/book/1", true, &alive_for(2));
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn test_cancel_before_detail_init_rule() {
    let source = detail_source(Some(r"https://x\.com/book/\d+"), Some(".info"));
    let result = analyze(Some(DETAIL_HTML), &source, "https://x.com/book/1", true, &alive_for(1));
    assert!(matches!(result, Err(Error::Cancelled)));

    let books = analyze(Some(DETAIL_HTML), &source, "https://x.com/book/1", true, &alive_for(usize::MAX))
        .expect("expected Ok(_)");
    assert_eq!(books[0].name, "Dune");
}
