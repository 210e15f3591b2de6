//! Query candidates and their revision chains.

use refine_query::QueryNode;
use serde::Serialize;

use crate::features::{FeatureVector, LearntFeature};

/// A query variant together with the provenance needed to rank it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Topic (information need) the query is written for.
    pub topic: String,
    /// The query itself.
    pub query: QueryNode,
    /// Index of the transformation that produced this candidate; `None` for a seed.
    pub transformation_id: Option<usize>,
    /// Features attached by a featurizer before scoring.
    pub features: FeatureVector,
    /// Previously accepted candidates, oldest first.
    #[serde(skip)]
    pub chain: Vec<Candidate>,
}

impl Candidate {
    /// Creates a seed candidate with no history.
    pub fn seed(topic: impl Into<String>, query: QueryNode) -> Self {
        Self {
            topic: topic.into(),
            query,
            transformation_id: None,
            features: FeatureVector::default(),
            chain: Vec::new(),
        }
    }

    /// Creates a variant produced by transformation `transformation_id`, inheriting `chain`.
    pub fn variant(
        topic: impl Into<String>,
        query: QueryNode,
        transformation_id: usize,
        chain: Vec<Self>,
    ) -> Self {
        Self {
            topic: topic.into(),
            query,
            transformation_id: Some(transformation_id),
            features: FeatureVector::default(),
            chain,
        }
    }

    /// Replaces the attached features.
    #[must_use]
    pub fn with_features(mut self, features: FeatureVector) -> Self {
        self.features = features;
        self
    }

    /// Returns a copy of this candidate with `parent` appended to its chain.
    ///
    /// Neither `self` nor `parent` is modified.
    #[must_use]
    pub fn appended(&self, parent: &Self) -> Self {
        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        chain.extend_from_slice(&self.chain);
        chain.push(parent.clone());
        Self {
            chain,
            ..self.clone()
        }
    }

    /// Returns this candidate's features as an unlabelled ranking record.
    ///
    /// The canonical query string is carried as the comment so exported lines stay readable.
    pub fn to_learnt_feature(&self) -> LearntFeature {
        LearntFeature::new(self.topic.clone(), self.features.clone())
            .with_comment(self.query.to_query_string())
    }
}
