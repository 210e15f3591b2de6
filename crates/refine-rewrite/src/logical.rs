//! Logical operator replacement.
//!
//! Flips `AND` to `OR` (and back) on any subset of operator nodes, keeping only variants that
//! stay close to the original.

use log::debug;
use refine_query::{BooleanQuery, QueryNode};

use crate::{
    RewriteError, Transformation,
    signature::{dedup_by_signature, differing_operators, operator_path, operator_signature},
};

/// Maximum number of operator positions a variant may change.
const MAX_CHANGED_OPERATORS: usize = 2;

/// Replaces `AND` with `OR` and vice versa.
///
/// The identity is part of the output, so a selector can decide that no change is best.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicalOperatorReplacement;

impl LogicalOperatorReplacement {
    /// Generates every combination of inversions reachable from `query`.
    fn permutations(query: &QueryNode) -> Vec<QueryNode> {
        let QueryNode::Boolean(node) = query else {
            return Vec::new();
        };

        let mut seeds: Vec<BooleanQuery> = vec![BooleanQuery::clone(node)];
        if let Some(inverted) = node.operator().inverted() {
            seeds.push(node.with_operator(inverted));
        }

        let mut out: Vec<QueryNode> = Vec::new();
        for seed in &seeds {
            for (j, child) in seed.children().iter().enumerate() {
                for applied in Self::permutations(child) {
                    out.push(seed.with_child(j, applied).into());
                }
            }
        }
        out.extend(seeds.into_iter().map(QueryNode::from));
        out
    }
}

impl Transformation for LogicalOperatorReplacement {
    fn name(&self) -> &'static str {
        "logical_operator_replacement"
    }

    fn apply(&self, query: &QueryNode) -> Result<Vec<QueryNode>, RewriteError> {
        let original = operator_path(query);
        let permutations = Self::permutations(query);
        let generated = permutations.len();

        let close = permutations.into_iter().filter(|p| {
            differing_operators(&original, &operator_path(p)) <= MAX_CHANGED_OPERATORS
        });
        let variants = dedup_by_signature(close, operator_signature);

        debug!(
            "{}: {generated} permutations, {} kept",
            self.name(),
            variants.len()
        );
        Ok(variants)
    }
}
