//! Error types for candidate selection and refinement.

use std::{io, path::PathBuf, process::ExitStatus};

use refine_rewrite::RewriteError;
use thiserror::Error;

/// Errors that can occur while enumerating, scoring, or selecting candidates.
#[derive(Debug, Error)]
pub enum LearningError {
    /// Reading, writing, or removing an exchange file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Writing a feature record to an output sink failed.
    #[error("failed to write features: {0}")]
    Output(#[source] io::Error),

    /// The external ranker could not be started.
    #[error("failed to launch {binary}: {source}")]
    Launch {
        /// The binary that failed to start.
        binary: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The external ranker exited unsuccessfully.
    #[error("{binary} exited with {status}")]
    Exit {
        /// The binary that failed.
        binary: PathBuf,
        /// Its exit status.
        status: ExitStatus,
    },

    /// A line of the score file is not a number.
    #[error("malformed score on line {line} of {path}: {text:?}")]
    MalformedScore {
        /// The score file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },

    /// The ranker produced a different number of scores than candidates written.
    #[error("expected {expected} scores, found {found}")]
    ScoreCount {
        /// Number of candidates written.
        expected: usize,
        /// Number of scores read.
        found: usize,
    },

    /// Selection was requested over an empty batch.
    #[error("cannot select from an empty batch of candidates")]
    EmptyBatch,

    /// A feature line could not be parsed.
    #[error("malformed feature line: {reason}")]
    MalformedFeature {
        /// Why the line was rejected.
        reason: String,
    },

    /// A retried operation kept failing.
    #[error("gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        source: Box<LearningError>,
    },

    /// A transformation failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl LearningError {
    /// Builds a [`LearningError::Io`] for `path`.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Returns true if retrying the operation could plausibly succeed.
    ///
    /// Only subprocess failures are transient. Malformed output and local I/O are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::Exit { .. })
    }
}
