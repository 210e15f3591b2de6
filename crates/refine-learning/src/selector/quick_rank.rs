//! QuickRank (LambdaMART) backed selection and training.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    fs,
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

/// Score file name used when the `scores` argument is not configured.
pub const DEFAULT_SCORES_FILE: &str = "scores.txt";

/// Name of the training file written by [`QuickRankSelector::train`].
const TRAINING_FILE: &str = "training.txt";

/// Ranks candidates by invoking QuickRank with a fixed set of arguments.
///
/// Every argument becomes a `--key value` pair, in key order. Inference appends
/// `--test <features>` and points `--scores` at a file in the per-call exchange directory, so
/// concurrent selectors never write the same score file.
#[derive(Debug, Clone)]
pub struct QuickRankSelector {
    /// Path to the `quicklearn` executable.
    binary: PathBuf,
    /// Command-line arguments, without leading dashes.
    arguments: BTreeMap<String, String>,
    /// Retry policy for invocations.
    policy: RetryPolicy,
    /// Selection counter.
    progress: Progress,
}

impl QuickRankSelector {
    /// Creates a selector invoking `binary` with `arguments`.
    pub fn new(binary: impl Into<PathBuf>, arguments: BTreeMap<String, String>) -> Self {
        Self {
            binary: binary.into(),
            arguments,
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

    /// Returns the configured arguments.
    pub fn arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    /// Returns the selection counter.
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Returns the file name scores are written to inside the exchange directory.
    fn scores_file_name(&self) -> OsString {
        self.arguments
            .get("scores")
            .and_then(|s| Path::new(s).file_name())
            .map_or_else(|| DEFAULT_SCORES_FILE.into(), ToOwned::to_owned)
    }

    /// Builds the command line: configured arguments with `overrides` applied, then `extra`.
    fn command_line(
        &self,
        overrides: &[(&str, &Path)],
        extra: &[(&str, &Path)],
    ) -> Vec<OsString> {
        let mut merged: BTreeMap<&str, OsString> = self
            .arguments
            .iter()
            .map(|(k, v)| (k.as_str(), OsString::from(v)))
            .collect();
        for (key, value) in overrides {
            merged.insert(*key, value.as_os_str().to_owned());
        }

        let mut args: Vec<OsString> = Vec::with_capacity(2 * (merged.len() + extra.len()));
        for (key, value) in merged.into_iter().chain(
            extra
                .iter()
                .map(|(k, v)| (*k, v.as_os_str().to_owned())),
        ) {
            args.push(format!("--{key}").into());
            args.push(value);
        }
        args
    }

    /// Runs the binary under the retry policy.
    fn invoke(&self, args: &[OsString]) -> Result<(), LearningError> {
        self.policy
            .run("quick_rank", || process::run(&self.binary, args))
    }
}

impl CandidateSelector for QuickRankSelector {
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
            batch.iter().try_for_each(|candidate| {
                LearntFeature::new(current.topic.clone(), candidate.features.clone())
                    .write_libsvm_rank(w)
            })
        })?;
        let scores_path = exchange.path(self.scores_file_name());

        let args = self.command_line(
            &[("scores", scores_path.as_path())],
            &[("test", features.as_path())],
        );
        self.invoke(&args)?;

        let scores = read_scores(&scores_path)?;
        exchange.close()?;
        choose(&mut self.progress, current, batch, &scores)
    }

    /// Trains a model from `features`.
    ///
    /// Returns the bytes of the `model-out` file if that argument is configured, otherwise an
    /// empty vector.
    fn train(&self, features: &[LearntFeature]) -> Result<Vec<u8>, LearningError> {
        if features.is_empty() {
            return Err(LearningError::EmptyBatch);
        }

        let exchange = Exchange::new()?;
        let training = exchange.write(TRAINING_FILE, |w| {
            features.iter().try_for_each(|f| f.write_libsvm_rank(w))
        })?;
        debug!("training quick_rank on {} records", features.len());

        let args = self.command_line(&[], &[("train", training.as_path())]);
        self.invoke(&args)?;

        let model = match self.arguments.get("model-out") {
            Some(model) => fs::read(model).map_err(LearningError::io(model))?,
            None => Vec::new(),
        };
        exchange.close()?;
        Ok(model)
    }

    fn state(&self) -> SelectionState {
        self.progress.state()
    }

    fn reset(&mut self) {
        self.progress.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(arguments: &[(&str, &str)]) -> QuickRankSelector {
        QuickRankSelector::new(
            "quicklearn",
            arguments
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn arguments_are_sorted_by_key() {
        let qr = selector(&[
            ("train-metric", "NDCG"),
            ("algo", "LAMBDAMART"),
            ("num-trees", "100"),
        ]);
        let args = qr.command_line(&[], &[("test", Path::new("f.txt"))]);
        assert_eq!(
            strings(&args),
            vec![
                "--algo",
                "LAMBDAMART",
                "--num-trees",
                "100",
                "--train-metric",
                "NDCG",
                "--test",
                "f.txt"
            ]
        );
    }

    #[test]
    fn overrides_replace_configured_values() {
        let qr = selector(&[("scores", "out/scores.txt"), ("algo", "LAMBDAMART")]);
        let args = qr.command_line(&[("scores", Path::new("/tmp/x/scores.txt"))], &[]);
        assert_eq!(
            strings(&args),
            vec!["--algo", "LAMBDAMART", "--scores", "/tmp/x/scores.txt"]
        );
    }

    #[test]
    fn scores_file_name_uses_basename() {
        assert_eq!(selector(&[]).scores_file_name(), OsString::from("scores.txt"));
        assert_eq!(
            selector(&[("scores", "runs/custom.scores")]).scores_file_name(),
            OsString::from("custom.scores")
        );
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let err = selector(&[]).train(&[]).unwrap_err();
        assert!(matches!(err, LearningError::EmptyBatch));
    }
}
