//! Candidate selection through external learning-to-rank tools.

mod quick_rank;
mod svm_rank;

use std::io::Write;

use log::debug;
pub use quick_rank::{DEFAULT_SCORES_FILE, QuickRankSelector};
pub use svm_rank::SvmRankSelector;

use crate::{
    LearningError,
    candidate::Candidate,
    exchange::best_index,
    features::LearntFeature,
};

/// Number of selections after which a selector stops by default.
pub const DEFAULT_STOPPING_THRESHOLD: u32 = 5;

/// Name of the feature file written for each invocation.
const FEATURES_FILE: &str = "features.txt";

/// Why a selector stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured number of selections was reached.
    Threshold,
    /// The last selection returned the query it was given.
    Fixpoint,
}

/// Whether a selector is willing to refine further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// More selections are allowed; `depth` have been made so far.
    Continue {
        /// Number of selections made.
        depth: u32,
    },
    /// No more selections should be made.
    Stop(StopReason),
}

/// Selection counter and stopping rule shared by every selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Number of selections made.
    depth: u32,
    /// Depth at which to stop.
    threshold: u32,
    /// Set once a selection returns its input unchanged.
    fixpoint: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(DEFAULT_STOPPING_THRESHOLD)
    }
}

impl Progress {
    /// Creates a counter that stops after `threshold` selections.
    pub fn new(threshold: u32) -> Self {
        Self {
            depth: 0,
            threshold,
            fixpoint: false,
        }
    }

    /// Returns the number of selections made.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns the stopping threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Records that `chosen` was selected as the successor of `current`.
    pub fn record(&mut self, current: &Candidate, chosen: &Candidate) {
        self.depth = self.depth.saturating_add(1);
        if chosen.query.to_query_string() == current.query.to_query_string() {
            self.fixpoint = true;
        }
    }

    /// Forgets all selections, keeping the threshold.
    pub fn reset(&mut self) {
        *self = Self::new(self.threshold);
    }

    /// Returns the current state. A fixpoint stops regardless of the threshold.
    pub fn state(&self) -> SelectionState {
        if self.fixpoint {
            SelectionState::Stop(StopReason::Fixpoint)
        } else if self.depth >= self.threshold {
            SelectionState::Stop(StopReason::Threshold)
        } else {
            SelectionState::Continue { depth: self.depth }
        }
    }
}

/// Chooses the next query from a batch of scored variants.
pub trait CandidateSelector {
    /// Ranks `batch` and returns the best candidate with `current` appended to its chain.
    ///
    /// Fails with [`LearningError::EmptyBatch`] if `batch` is empty.
    fn select(&mut self, current: &Candidate, batch: &[Candidate])
    -> Result<Candidate, LearningError>;

    /// Trains a model from labelled records and returns the model bytes.
    fn train(&self, features: &[LearntFeature]) -> Result<Vec<u8>, LearningError>;

    /// Writes `feature` in the format this selector trains from.
    fn output(&self, feature: &LearntFeature, sink: &mut dyn Write) -> Result<(), LearningError> {
        feature
            .write_libsvm_rank(sink)
            .map_err(LearningError::Output)
    }

    /// Returns whether further selections are allowed.
    fn state(&self) -> SelectionState;

    /// Clears the selection history so a new refinement can start.
    fn reset(&mut self);

    /// Returns true once the selector has stopped.
    fn stopping_criteria(&self) -> bool {
        matches!(self.state(), SelectionState::Stop(_))
    }
}

/// Picks the best-scored candidate from `scores` and records the step in `progress`.
fn choose(
    progress: &mut Progress,
    current: &Candidate,
    batch: &[Candidate],
    scores: &[f64],
) -> Result<Candidate, LearningError> {
    let index = best_index(scores, batch.len())?;
    let winner = &batch[index];
    debug!(
        "selected candidate {index} of {} (score {}): {}",
        batch.len(),
        scores[index],
        winner.query
    );
    progress.record(current, winner);
    Ok(winner.appended(current))
}

#[cfg(test)]
mod tests {
    use refine_query::parse;

    use super::*;

    fn candidate(query: &str) -> Candidate {
        Candidate::seed("t1", parse(query).unwrap().unwrap())
    }

    #[test]
    fn reset_clears_depth_and_fixpoint() {
        let mut progress = Progress::new(3);
        progress.record(&candidate("a AND b"), &candidate("a AND b"));
        assert_eq!(progress.state(), SelectionState::Stop(StopReason::Fixpoint));
        progress.reset();
        assert_eq!(progress.state(), SelectionState::Continue { depth: 0 });
        assert_eq!(progress.threshold(), 3);
    }

    #[test]
    fn continues_below_threshold() {
        let mut progress = Progress::new(2);
        assert_eq!(progress.state(), SelectionState::Continue { depth: 0 });
        progress.record(&candidate("a AND b"), &candidate("a OR b"));
        assert_eq!(progress.state(), SelectionState::Continue { depth: 1 });
        progress.record(&candidate("a OR b"), &candidate("a AND b"));
        assert_eq!(progress.state(), SelectionState::Stop(StopReason::Threshold));
    }

    #[test]
    fn fixpoint_stops_regardless_of_threshold() {
        let mut progress = Progress::new(100);
        progress.record(&candidate("a AND b"), &candidate("a AND b"));
        assert_eq!(progress.depth(), 1);
        assert_eq!(progress.state(), SelectionState::Stop(StopReason::Fixpoint));
    }

    #[test]
    fn zero_threshold_stops_immediately() {
        assert_eq!(
            Progress::new(0).state(),
            SelectionState::Stop(StopReason::Threshold)
        );
    }

    #[test]
    fn choose_appends_current_and_records() {
        let current = candidate("a AND b");
        let batch = [candidate("a OR b"), candidate("a AND b")];
        let mut progress = Progress::default();

        let chosen = choose(&mut progress, &current, &batch, &[0.9, 0.1]).unwrap();

        assert_eq!(chosen.query, batch[0].query);
        assert_eq!(chosen.chain, vec![current]);
        assert_eq!(progress.state(), SelectionState::Continue { depth: 1 });
    }

    #[test]
    fn choose_rejects_wrong_score_count() {
        let current = candidate("a AND b");
        let mut progress = Progress::default();
        let err = choose(&mut progress, &current, &[candidate("a OR b")], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, LearningError::ScoreCount { .. }));
        assert_eq!(progress.depth(), 0);
    }
}
