//! Canonical signatures used to deduplicate query variants.
//!
//! A signature is a deterministic string built from the attributes a transformation can
//! change. Two variants with the same signature are the same variant.

use std::collections::HashSet;

use refine_query::{EXPLODED_OPTION, QueryNode};

/// Returns the symbol of every operator node, depth-first pre-order.
pub fn operator_path(query: &QueryNode) -> Vec<String> {
    query
        .boolean_queries()
        .iter()
        .map(|b| b.operator().symbol())
        .collect()
}

/// Returns the operator signature: the operator path joined with commas.
pub fn operator_signature(query: &QueryNode) -> String {
    operator_path(query).join(",")
}

/// Counts the positions of `original` whose operator differs in `variant`.
///
/// A position missing from `variant` counts as a difference.
pub fn differing_operators(original: &[String], variant: &[String]) -> usize {
    original
        .iter()
        .enumerate()
        .filter(|(i, op)| variant.get(*i) != Some(*op))
        .count()
}

/// Returns the `(query string, exploded)` signature of every keyword in document order.
pub fn exploded_signature(query: &QueryNode) -> String {
    query
        .keywords()
        .iter()
        .map(|k| match k.option(EXPLODED_OPTION) {
            Some(exploded) => format!("{:?}:{exploded}", k.query_string()),
            None => format!("{:?}:-", k.query_string()),
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Returns the `(query string, fields)` signature of every keyword in document order.
pub fn field_signature(query: &QueryNode) -> String {
    query
        .keywords()
        .iter()
        .map(|k| format!("{:?}[{}]", k.query_string(), k.fields().join(",")))
        .collect::<Vec<_>>()
        .join("|")
}

/// Keeps the first query for each signature, preserving input order.
pub(crate) fn dedup_by_signature<I, F>(queries: I, signature: F) -> Vec<QueryNode>
where
    I: IntoIterator<Item = QueryNode>,
    F: Fn(&QueryNode) -> String,
{
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .filter(|q| seen.insert(signature(q)))
        .collect()
}
