//! Implementation of `refine parse`.

use std::process::ExitCode;

use refine_query::QueryNode;
use serde::Serialize;

use super::shared::parse_query;
use crate::cli::{args::ParseCommand, output::print_json};

/// JSON output for `refine parse`.
#[derive(Serialize)]
struct JsonParse<'a> {
    /// Canonical query string.
    query: String,
    /// Nesting depth of operators.
    depth: usize,
    /// Number of keyword leaves.
    keywords: usize,
    /// The tree itself.
    tree: &'a QueryNode,
}

/// Parses a query and prints its canonical form and tree.
pub fn run(cmd: &ParseCommand) -> ExitCode {
    let query = match parse_query(&cmd.query) {
        Ok(query) => query,
        Err(code) => return code,
    };

    if cmd.json {
        return print_json(&JsonParse {
            query: query.to_query_string(),
            depth: query.depth(),
            keywords: query.keywords().len(),
            tree: &query,
        });
    }

    println!("{}", query.to_query_string());
    println!();
    print!("{}", query.to_tree_string());
    ExitCode::SUCCESS
}
