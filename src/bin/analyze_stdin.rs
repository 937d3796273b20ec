//! Simple CLI that reads a fetched page from stdin and prints the extracted
//! books as JSON.
//!
//! Usage: `analyze_stdin <source.json> <base-url> [--explore]`
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::io::{self, Read};
use std::process::ExitCode;

use rs_booklist::{analyze, NeverCancel, SourceConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let is_search = !args.iter().any(|a| a == "--explore");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let [source_path, base_url] = positional.as_slice() else {
        eprintln!("usage: analyze_stdin <source.json> <base-url> [--explore]");
        return ExitCode::from(2);
    };

    let source = match std::fs::read_to_string(source_path)
        .map_err(|e| e.to_string())
        .and_then(|json| SourceConfig::from_json(&json).map_err(|e| e.to_string()))
    {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to load source {source_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut body = String::new();
    if io::stdin().read_to_string(&mut body).is_err() {
        eprintln!("Failed to read from stdin");
        return ExitCode::FAILURE;
    }

    match analyze(Some(&body), &source, base_url, is_search, &NeverCancel) {
        Ok(books) => match serde_json::to_string_pretty(&books) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to serialize books: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Extraction failed: {e}");
            ExitCode::FAILURE
        }
    }
}
