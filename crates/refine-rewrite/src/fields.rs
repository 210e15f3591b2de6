//! Field restriction rewrites between title and abstract.

use log::debug;
use refine_query::{ABSTRACT_FIELD, Keyword, QueryNode, TITLE_FIELD};

use crate::{
    RewriteError, Transformation,
    signature::{dedup_by_signature, field_signature},
};

/// Moves keywords between the title and abstract fields, one keyword at a time.
///
/// - title only: swap to abstract, or search both
/// - abstract only: swap to title, or search both
/// - both: drop title, or drop abstract
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRestrictions;

impl FieldRestrictions {
    /// Returns the field rewrites of a single keyword.
    fn restrict(keyword: &Keyword) -> Vec<Keyword> {
        let fields = keyword.fields();
        let title = fields.iter().position(|f| f == TITLE_FIELD);
        let abstract_ = fields.iter().position(|f| f == ABSTRACT_FIELD);

        match (title, abstract_) {
            (Some(pos), None) => vec![
                keyword.with_fields(replaced(fields, pos, ABSTRACT_FIELD)),
                keyword.with_fields(extended(fields, ABSTRACT_FIELD)),
            ],
            (None, Some(pos)) => vec![
                keyword.with_fields(replaced(fields, pos, TITLE_FIELD)),
                keyword.with_fields(extended(fields, TITLE_FIELD)),
            ],
            (Some(t), Some(a)) => vec![
                keyword.with_fields(removed(fields, t)),
                keyword.with_fields(removed(fields, a)),
            ],
            (None, None) => Vec::new(),
        }
    }

    /// Generates one variant per field rewrite reachable from `query`.
    fn permutations(query: &QueryNode) -> Vec<QueryNode> {
        match query {
            QueryNode::Keyword(keyword) => Self::restrict(keyword)
                .into_iter()
                .map(QueryNode::from)
                .collect(),
            QueryNode::Boolean(node) => {
                let mut out: Vec<QueryNode> = Vec::new();
                for (j, child) in node.children().iter().enumerate() {
                    for applied in Self::permutations(child) {
                        out.push(node.with_child(j, applied).into());
                    }
                }
                out
            }
        }
    }
}

/// Returns `fields` with position `pos` set to `field`.
fn replaced(fields: &[String], pos: usize, field: &str) -> Vec<String> {
    let mut out = fields.to_vec();
    out[pos] = field.to_string();
    out
}

/// Returns `fields` with `field` appended.
fn extended(fields: &[String], field: &str) -> Vec<String> {
    let mut out = fields.to_vec();
    out.push(field.to_string());
    out
}

/// Returns `fields` without position `pos`.
fn removed(fields: &[String], pos: usize) -> Vec<String> {
    let mut out = fields.to_vec();
    out.remove(pos);
    out
}

impl Transformation for FieldRestrictions {
    fn name(&self) -> &'static str {
        "field_restrictions"
    }

    fn apply(&self, query: &QueryNode) -> Result<Vec<QueryNode>, RewriteError> {
        let variants = dedup_by_signature(Self::permutations(query), field_signature);
        debug!("{}: {} variants", self.name(), variants.len());
        Ok(variants)
    }
}
