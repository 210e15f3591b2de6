//! Candidate featurization.

use refine_query::{ABSTRACT_FIELD, EXPLODED_OPTION, MESH_HEADINGS_FIELD, Operator, TITLE_FIELD};

use crate::{
    LearningError,
    candidate::Candidate,
    features::{Feature, FeatureVector},
};

/// Computes the feature vector a selector ranks a candidate by.
pub trait Featurizer {
    /// Returns the features of `candidate`.
    fn featurize(&self, candidate: &Candidate) -> Result<FeatureVector, LearningError>;
}

/// Structural features of the query tree and its provenance.
///
/// Every feature is computed from the tree alone, so the featurizer needs no index or
/// collection statistics. Ids are one-based positions in [`StructuralFeatures::NAMES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralFeatures;

impl StructuralFeatures {
    /// Feature names in id order.
    pub const NAMES: [&'static str; 14] = [
        "depth",
        "keywords",
        "operators",
        "and_operators",
        "or_operators",
        "not_operators",
        "adj_operators",
        "max_adj_distance",
        "title_fields",
        "abstract_fields",
        "mesh_fields",
        "mesh_exploded",
        "mesh_not_exploded",
        "transformation",
    ];
}

impl Featurizer for StructuralFeatures {
    fn featurize(&self, candidate: &Candidate) -> Result<FeatureVector, LearningError> {
        let query = &candidate.query;
        let operators: Vec<Operator> = query
            .boolean_queries()
            .iter()
            .map(|b| b.operator())
            .collect();
        let keywords = query.keywords();

        let count_ops = |pred: fn(&Operator) -> bool| operators.iter().filter(|o| pred(o)).count();
        let count_fields =
            |field: &str| keywords.iter().filter(|k| k.has_field(field)).count();
        let count_mesh = |exploded: bool| {
            keywords
                .iter()
                .filter(|k| {
                    k.has_field(MESH_HEADINGS_FIELD) && k.option(EXPLODED_OPTION) == Some(exploded)
                })
                .count()
        };

        let max_distance = operators.iter().filter_map(Operator::distance).max().unwrap_or(0);
        let transformation = candidate.transformation_id.map_or(0, |id| id + 1);

        let values = [
            query.depth() as f64,
            keywords.len() as f64,
            operators.len() as f64,
            count_ops(|o| *o == Operator::And) as f64,
            count_ops(|o| *o == Operator::Or) as f64,
            count_ops(|o| *o == Operator::Not) as f64,
            count_ops(|o| matches!(o, Operator::Adj(_))) as f64,
            f64::from(max_distance),
            count_fields(TITLE_FIELD) as f64,
            count_fields(ABSTRACT_FIELD) as f64,
            count_fields(MESH_HEADINGS_FIELD) as f64,
            count_mesh(true) as f64,
            count_mesh(false) as f64,
            transformation as f64,
        ];

        Ok(Self::NAMES
            .iter()
            .zip(values)
            .zip(1..)
            .map(|((name, value), id)| Feature::new(id, *name, value))
            .collect())
    }
}
