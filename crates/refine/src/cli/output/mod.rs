//! Rendering and JSON serialization for CLI output.

use std::{fmt, process::ExitCode};

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use refine_learning::{Candidate, Refinement};
use refine_query::QueryNode;
use refine_rewrite::{Transformation, TransformationKind};
use serde::Serialize;

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints `err` in the CLI's error format and returns a failure code.
pub fn fail(err: &impl fmt::Display) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}

/// Names the transformation that produced `candidate`.
pub fn transformation_name(candidate: &Candidate, kinds: &[TransformationKind]) -> &'static str {
    candidate
        .transformation_id
        .and_then(|id| kinds.get(id))
        .map_or("seed", |kind| kind.name())
}

/// A variant as shown by `refine variants --json`.
#[derive(Serialize)]
pub struct JsonVariant<'a> {
    /// Producing transformation.
    pub transformation: &'static str,
    /// Canonical query string.
    pub query: String,
    /// The query tree.
    pub tree: &'a QueryNode,
}

/// Renders variants as a table.
pub fn variants_table(variants: &[Candidate], kinds: &[TransformationKind]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["#", "Transformation", "Query"]);
    for (i, variant) in variants.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(transformation_name(variant, kinds)),
            Cell::new(variant.query.to_query_string()),
        ]);
    }
    table
}

/// Renders the chosen chain of a refinement as a table.
pub fn refinement_table(refinement: &Refinement, kinds: &[TransformationKind]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Step", "Transformation", "Query"]);
    for (i, candidate) in refinement.chain.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(transformation_name(candidate, kinds)),
            Cell::new(candidate.query.to_query_string()),
        ]);
    }
    table
}
