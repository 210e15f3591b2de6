//! MeSH explosion toggling.

use log::debug;
use refine_query::{EXPLODED_OPTION, Keyword, MESH_HEADINGS_FIELD, QueryNode};

use crate::{
    RewriteError, Transformation,
    signature::{dedup_by_signature, exploded_signature},
};

/// Flips the `exploded` option of MeSH heading keywords, one keyword at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshExplosion;

impl MeshExplosion {
    /// Returns the keyword with its explosion flipped, if it is an explodable heading.
    fn toggle(keyword: &Keyword) -> Option<Keyword> {
        if !keyword.has_field(MESH_HEADINGS_FIELD) {
            return None;
        }
        let exploded = keyword.option(EXPLODED_OPTION)?;
        Some(keyword.with_option(EXPLODED_OPTION, !exploded))
    }

    /// Generates one variant per explodable keyword reachable from `query`.
    fn permutations(query: &QueryNode) -> Vec<QueryNode> {
        match query {
            QueryNode::Keyword(keyword) => {
                Self::toggle(keyword).map(QueryNode::from).into_iter().collect()
            }
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

impl Transformation for MeshExplosion {
    fn name(&self) -> &'static str {
        "mesh_explosion"
    }

    fn apply(&self, query: &QueryNode) -> Result<Vec<QueryNode>, RewriteError> {
        let variants = dedup_by_signature(Self::permutations(query), exploded_signature);
        debug!("{}: {} variants", self.name(), variants.len());
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use refine_query::parse;

    use super::*;

    fn q(s: &str) -> QueryNode {
        parse(s).unwrap().unwrap()
    }

    fn apply(s: &str) -> Vec<String> {
        MeshExplosion
            .apply(&q(s))
            .unwrap()
            .iter()
            .map(QueryNode::to_query_string)
            .collect()
    }

    #[test]
    fn flips_exploded_heading() {
        assert_eq!(
            apply("Neoplasms[mesh_headings]{exploded=true} AND tumor[title]"),
            vec!["(Neoplasms[mesh_headings]{exploded=false} AND tumor[title])"]
        );
    }

    #[test]
    fn root_keyword_is_toggled() {
        assert_eq!(
            apply("Neoplasms[mesh_headings]{exploded=false}"),
            vec!["Neoplasms[mesh_headings]{exploded=true}"]
        );
    }

    #[test]
    fn toggle_is_an_involution() {
        let original = q("Neoplasms[mesh_headings]{exploded=true} OR cancer");
        let once = MeshExplosion.apply(&original).unwrap();
        assert_eq!(once.len(), 1);
        let twice = MeshExplosion.apply(&once[0]).unwrap();
        assert_eq!(twice, vec![original]);
    }

    #[test]
    fn ignores_headings_without_option() {
        assert!(apply("Neoplasms[mesh_headings] AND cancer").is_empty());
    }

    #[test]
    fn ignores_option_outside_mesh_field() {
        assert!(apply("Neoplasms[title]{exploded=true}").is_empty());
    }

    #[test]
    fn one_variant_per_heading_in_nested_groups() {
        let variants = apply(
            "(A[mesh_headings]{exploded=true} OR B[mesh_headings]{exploded=false}) AND c",
        );
        assert_eq!(
            variants,
            vec![
                "((A[mesh_headings]{exploded=false} OR B[mesh_headings]{exploded=false}) AND c)",
                "((A[mesh_headings]{exploded=true} OR B[mesh_headings]{exploded=true}) AND c)",
            ]
        );
    }
}
