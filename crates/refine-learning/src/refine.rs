//! The iterative refinement loop.

use log::info;
use refine_rewrite::TransformationKind;
use serde::Serialize;

use crate::{
    LearningError,
    candidate::Candidate,
    featurize::Featurizer,
    selector::{CandidateSelector, SelectionState, StopReason},
    variations::variations,
};

/// Why a refinement loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The selector reached its stopping threshold.
    Threshold,
    /// The selector chose the query it was given.
    Fixpoint,
    /// No transformation produced a variant.
    Exhausted,
}

impl From<StopReason> for TerminationReason {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Threshold => Self::Threshold,
            StopReason::Fixpoint => Self::Fixpoint,
        }
    }
}

/// The outcome of a refinement loop.
#[derive(Debug, Clone, Serialize)]
pub struct Refinement {
    /// The last candidate chosen, or the seed if nothing was chosen.
    pub best: Candidate,
    /// Every chosen candidate, in order.
    pub chain: Vec<Candidate>,
    /// Number of selections made.
    pub iterations: u32,
    /// Why the loop stopped.
    pub reason: TerminationReason,
}

/// Repeatedly rewrites a query and keeps the variant the selector ranks highest.
pub struct Refiner {
    /// Transformations applied at every step, in order.
    transformations: Vec<TransformationKind>,
    /// Attaches features to every variant before ranking.
    featurizer: Box<dyn Featurizer>,
    /// Ranks variants and decides when to stop.
    selector: Box<dyn CandidateSelector>,
}

impl Refiner {
    /// Creates a refiner.
    pub fn new(
        transformations: Vec<TransformationKind>,
        featurizer: Box<dyn Featurizer>,
        selector: Box<dyn CandidateSelector>,
    ) -> Self {
        Self {
            transformations,
            featurizer,
            selector,
        }
    }

    /// Returns the selector.
    pub fn selector(&self) -> &dyn CandidateSelector {
        self.selector.as_ref()
    }

    /// Refines `seed` until the selector stops or no variants remain.
    ///
    /// The selector is reset first, so each call starts from depth zero.
    pub fn run(&mut self, seed: Candidate) -> Result<Refinement, LearningError> {
        self.selector.reset();
        let features = self.featurizer.featurize(&seed)?;
        let mut current = seed.with_features(features);
        let mut chain = Vec::new();
        let mut iterations = 0u32;

        let reason = loop {
            if let SelectionState::Stop(reason) = self.selector.state() {
                break TerminationReason::from(reason);
            }

            let variants = variations(&current, &self.transformations)?;
            if variants.is_empty() {
                break TerminationReason::Exhausted;
            }

            let batch = variants
                .into_iter()
                .map(|variant| {
                    let features = self.featurizer.featurize(&variant)?;
                    Ok(variant.with_features(features))
                })
                .collect::<Result<Vec<_>, LearningError>>()?;

            let chosen = self.selector.select(&current, &batch)?;
            iterations += 1;
            info!(
                "topic {}: iteration {iterations}, {} variants, chose {}",
                current.topic,
                batch.len(),
                chosen.query
            );

            chain.push(chosen.clone());
            current = chosen;
        };

        info!(
            "topic {}: stopped after {iterations} iterations ({reason:?})",
            current.topic
        );
        Ok(Refinement {
            best: current,
            chain,
            iterations,
            reason,
        })
    }
}
