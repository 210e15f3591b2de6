//! Variant enumeration across transformations.

use log::debug;
use refine_rewrite::{Transformation, TransformationKind};

use crate::{LearningError, candidate::Candidate};

/// Applies every transformation to `candidate` and collects the variants.
///
/// Each variant carries the candidate's topic and chain and the index of the transformation
/// that produced it. Variants are ordered by transformation, then by the transformation's
/// own output order. Duplicates across transformations are kept.
pub fn variations(
    candidate: &Candidate,
    transformations: &[TransformationKind],
) -> Result<Vec<Candidate>, LearningError> {
    let mut out = Vec::new();
    for (id, transformation) in transformations.iter().enumerate() {
        let queries = transformation.apply(&candidate.query)?;
        debug!(
            "{}: {} variants of {}",
            transformation.name(),
            queries.len(),
            candidate.query
        );
        out.extend(queries.into_iter().map(|query| {
            Candidate::variant(candidate.topic.clone(), query, id, candidate.chain.clone())
        }));
    }
    debug!("{} variants in total", out.len());
    Ok(out)
}
