//! Adjacency range widening and narrowing.

use log::debug;
use refine_query::{BooleanQuery, Operator, QueryNode};

use crate::{
    RewriteError, Transformation,
    signature::{dedup_by_signature, differing_operators, operator_path, operator_signature},
};

/// Maximum number of operator positions a variant may change.
const MAX_CHANGED_OPERATORS: usize = 2;

/// Moves every `ADJn` operator to `ADJ(n+1)` and, when `n > 1`, to `ADJ(n-1)`.
///
/// Unlike [`LogicalOperatorReplacement`](crate::LogicalOperatorReplacement), the identity is
/// never part of the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacencyRange;

impl AdjacencyRange {
    /// Returns the nodes a single operator node can become.
    fn seeds(node: &BooleanQuery) -> Result<Vec<BooleanQuery>, RewriteError> {
        let Some(distance) = node.operator().distance() else {
            return Ok(vec![node.clone()]);
        };

        let wider = distance
            .checked_add(1)
            .ok_or(RewriteError::DistanceOverflow { distance })?;

        let mut seeds = vec![node.with_operator(Operator::Adj(wider))];
        if distance > 1 {
            seeds.push(node.with_operator(Operator::Adj(distance - 1)));
        }
        Ok(seeds)
    }

    /// Generates every combination of distance changes reachable from `query`.
    fn permutations(query: &QueryNode) -> Result<Vec<QueryNode>, RewriteError> {
        let QueryNode::Boolean(node) = query else {
            return Ok(Vec::new());
        };

        let seeds = Self::seeds(node)?;

        let mut out: Vec<QueryNode> = Vec::new();
        for seed in &seeds {
            for (j, child) in seed.children().iter().enumerate() {
                for applied in Self::permutations(child)? {
                    out.push(seed.with_child(j, applied).into());
                }
            }
        }
        out.extend(seeds.into_iter().map(QueryNode::from));
        Ok(out)
    }
}

impl Transformation for AdjacencyRange {
    fn name(&self) -> &'static str {
        "adjacency_range"
    }

    fn apply(&self, query: &QueryNode) -> Result<Vec<QueryNode>, RewriteError> {
        let original = operator_path(query);
        let permutations = Self::permutations(query)?;
        let generated = permutations.len();

        let changed = permutations.into_iter().filter(|p| {
            let n = differing_operators(&original, &operator_path(p));
            n > 0 && n <= MAX_CHANGED_OPERATORS
        });
        let variants = dedup_by_signature(changed, operator_signature);

        debug!(
            "{}: {generated} permutations, {} kept",
            self.name(),
            variants.len()
        );
        Ok(variants)
    }
}
