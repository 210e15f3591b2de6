//! Feature vectors and their LibSVM-rank text encoding.
//!
//! Features travel to and from the external ranker as lines of the form
//!
//! ```text
//! <label> qid:<topic> <id>:<value> <id>:<value> ... [# comment]
//! ```
//!
//! with feature ids in ascending order.

use std::{fmt, io, io::Write, str::FromStr};

use serde::Serialize;

use crate::LearningError;

/// A single numeric feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    /// Numeric id used in the LibSVM encoding.
    pub id: u32,
    /// Human readable name.
    pub name: String,
    /// Feature value.
    pub value: f64,
}

impl Feature {
    /// Creates a feature.
    pub fn new(id: u32, name: impl Into<String>, value: f64) -> Self {
        Self {
            id,
            name: name.into(),
            value,
        }
    }
}

/// An ordered collection of features, sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<Feature>);

impl FeatureVector {
    /// Creates a vector, sorting the features by id.
    pub fn new(mut features: Vec<Feature>) -> Self {
        features.sort_by_key(|f| f.id);
        Self(features)
    }

    /// Returns the features in id order.
    pub fn features(&self) -> &[Feature] {
        &self.0
    }

    /// Returns the value of the feature called `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|f| f.name == name).map(|f| f.value)
    }

    /// Returns the number of features.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no features.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Feature> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, feature) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", feature.id, feature.value)?;
        }
        Ok(())
    }
}

/// A feature vector tied to a topic, optionally labelled with a relevance grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearntFeature {
    /// Topic (query id) the features belong to.
    pub topic: String,
    /// The features.
    pub features: FeatureVector,
    /// Relevance label; `None` is written as `0`.
    pub label: Option<f64>,
    /// Trailing comment, written after `#`.
    pub comment: Option<String>,
}

impl LearntFeature {
    /// Creates an unlabelled record.
    pub fn new(topic: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            topic: topic.into(),
            features,
            label: None,
            comment: None,
        }
    }

    /// Sets the relevance label.
    #[must_use]
    pub fn with_label(mut self, label: f64) -> Self {
        self.label = Some(label);
        self
    }

    /// Sets the trailing comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Writes this record as one LibSVM-rank line.
    pub fn write_libsvm_rank<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "{} qid:{}", self.label.unwrap_or(0.0), self.topic)?;
        if !self.features.is_empty() {
            write!(w, " {}", self.features)?;
        }
        if let Some(comment) = &self.comment {
            write!(w, " # {comment}")?;
        }
        writeln!(w)
    }
}

/// Builds a [`LearningError::MalformedFeature`].
fn malformed(reason: impl Into<String>) -> LearningError {
    LearningError::MalformedFeature {
        reason: reason.into(),
    }
}

impl FromStr for LearntFeature {
    type Err = LearningError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (body, comment) = match line.split_once('#') {
            Some((body, comment)) => (body, Some(comment.trim().to_string())),
            None => (line, None),
        };

        let mut parts = body.split_whitespace();

        let label_text = parts.next().ok_or_else(|| malformed("empty line"))?;
        let label: f64 = label_text
            .parse()
            .map_err(|_| malformed(format!("label is not a number: {label_text}")))?;

        let qid = parts.next().ok_or_else(|| malformed("missing qid"))?;
        let topic = qid
            .strip_prefix("qid:")
            .ok_or_else(|| malformed(format!("expected qid:<topic>, found {qid}")))?;

        let mut features = Vec::new();
        for pair in parts {
            let (id, value) = pair
                .split_once(':')
                .ok_or_else(|| malformed(format!("expected id:value, found {pair}")))?;
            let id: u32 = id
                .parse()
                .map_err(|_| malformed(format!("feature id is not an integer: {id}")))?;
            let value: f64 = value
                .parse()
                .map_err(|_| malformed(format!("feature value is not a number: {value}")))?;
            features.push(Feature::new(id, id.to_string(), value));
        }

        Ok(Self {
            topic: topic.to_string(),
            features: FeatureVector::new(features),
            label: Some(label),
            comment: comment.filter(|c| !c.is_empty()),
        })
    }
}
