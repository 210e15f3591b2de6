//! SVM-rank backed selection.

use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;

use super::{CandidateSelector, FEATURES_FILE, Progress, SelectionState, choose};
use crate::{
    LearningError,
    candidate::Candidate,
    exchange::{Exchange, read_scores},
    features::LearntFeature,
    process,
    retry::RetryPolicy,
};

/// Name of the prediction file the classifier writes.
const PREDICTIONS_FILE: &str = "predictions.txt";

/// Ranks candidates with a pre-trained SVM-rank model.
///
/// The classifier is invoked as `<binary> <features> <model> <predictions>`, with one bare
/// feature vector per line.
#[derive(Debug, Clone)]
pub struct SvmRankSelector {
    /// Path to the `svm_rank_classify` executable.
    binary: PathBuf,
    /// Path to the trained model.
    model: PathBuf,
    /// Retry policy for classifier invocations.
    policy: RetryPolicy,
    /// Selection counter.
    progress: Progress,
}

impl SvmRankSelector {
    /// Creates a selector using `binary` and the model at `model`.
    pub fn new(binary: impl Into<PathBuf>, model: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            policy: RetryPolicy::default(),
            progress: Progress::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the stopping threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.progress = Progress::new(threshold);
        self
    }

    /// Returns the model path.
    pub fn model(&self) -> &Path {
        &self.model
    }

    /// Returns the selection counter.
    pub fn progress(&self) -> Progress {
        self.progress
    }
}

impl CandidateSelector for SvmRankSelector {
    fn select(
        &mut self,
        current: &Candidate,
        batch: &[Candidate],
    ) -> Result<Candidate, LearningError> {
        if batch.is_empty() {
            return Err(LearningError::EmptyBatch);
        }

        let exchange = Exchange::new()?;
        let features = exchange.write(FEATURES_FILE, |w| {
            batch
                .iter()
                .try_for_each(|candidate| writeln!(w, "{}", candidate.features))
        })?;
        let predictions = exchange.path(PREDICTIONS_FILE);

        let args: Vec<OsString> = vec![
            features.into(),
            self.model.clone().into(),
            predictions.clone().into(),
        ];
        let binary = &self.binary;
        self.policy
            .run("svm_rank", || process::run(binary, &args))?;

        let scores = read_scores(&predictions)?;
        exchange.close()?;
        choose(&mut self.progress, current, batch, &scores)
    }

    /// SVM-rank models are trained offline; this returns the configured model unchanged.
    fn train(&self, features: &[LearntFeature]) -> Result<Vec<u8>, LearningError> {
        debug!(
            "svm_rank uses a pre-trained model, ignoring {} records",
            features.len()
        );
        fs::read(&self.model).map_err(LearningError::io(&self.model))
    }

    fn state(&self) -> SelectionState {
        self.progress.state()
    }

    fn reset(&mut self) {
        self.progress.reset();
    }
}
