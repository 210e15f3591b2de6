//! Helpers shared by several commands.

use std::process::ExitCode;

use refine_learning::{Candidate, Featurizer, LearningError, StructuralFeatures, variations};
use refine_query::{QueryNode, parse};
use refine_rewrite::TransformationKind;

use crate::cli::output::fail;

/// Topic used when a command has no topic of its own.
pub const NO_TOPIC: &str = "-";

/// Parses `text`, rejecting empty queries.
pub fn parse_query(text: &str) -> Result<QueryNode, ExitCode> {
    match parse(text) {
        Ok(Some(query)) => Ok(query),
        Ok(None) => Err(fail(&"query is empty")),
        Err(e) => Err(fail(&e)),
    }
}

/// Enumerates the featurized variants of `seed`.
pub fn featurized_variants(
    seed: &Candidate,
    kinds: &[TransformationKind],
) -> Result<Vec<Candidate>, ExitCode> {
    let featurizer = StructuralFeatures;
    variations(seed, kinds)
        .and_then(|variants| {
            variants
                .into_iter()
                .map(|v| {
                    let features = featurizer.featurize(&v)?;
                    Ok(v.with_features(features))
                })
                .collect::<Result<Vec<_>, LearningError>>()
        })
        .map_err(|e| fail(&e))
}
