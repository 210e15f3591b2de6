//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::{fmt, path::Path};

use crate::{Backend, Config, resolve::is_bare_name};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The transformation list is empty, so every refinement stops immediately.
    NoTransformations,
    /// The stopping threshold is zero, so no selection is ever made.
    ZeroThreshold,
    /// The SVM-rank backend is selected but no model is configured.
    ModelNotConfigured,
    /// The configured SVM-rank model does not exist.
    ModelMissing {
        /// Path that doesn't exist.
        path: String,
    },
    /// The active backend's executable is a path that does not exist.
    BinaryMissing {
        /// The active backend.
        backend: Backend,
        /// Path that doesn't exist.
        path: String,
    },
    /// The initial backoff exceeds the maximum backoff.
    BackoffInverted {
        /// Configured initial backoff.
        initial_ms: u64,
        /// Configured maximum backoff.
        max_ms: u64,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTransformations => write!(f, "no transformations are configured"),
            Self::ZeroThreshold => {
                write!(f, "stopping_threshold is 0; refinement will never select")
            }
            Self::ModelNotConfigured => {
                write!(f, "backend is svm_rank but selector.svm_rank.model is not set")
            }
            Self::ModelMissing { path } => write!(f, "svm_rank model does not exist: {path}"),
            Self::BinaryMissing { backend, path } => {
                write!(f, "{backend} binary does not exist: {path}")
            }
            Self::BackoffInverted { initial_ms, max_ms } => write!(
                f,
                "initial_backoff_ms ({initial_ms}) is greater than max_backoff_ms ({max_ms})"
            ),
        }
    }
}

/// Validates the configuration and returns any warnings.
///
/// Only the active backend's executable and model are checked. Bare executable names are
/// looked up on `PATH` at run time and are not checked here.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.refinement.transformations.is_empty() {
        warnings.push(ConfigWarning::NoTransformations);
    }
    if config.refinement.stopping_threshold == 0 {
        warnings.push(ConfigWarning::ZeroThreshold);
    }

    let selector = &config.selector;
    let binary = match selector.backend {
        Backend::SvmRank => {
            match selector.svm_rank.model {
                None => warnings.push(ConfigWarning::ModelNotConfigured),
                Some(ref model) if !model.exists() => {
                    warnings.push(ConfigWarning::ModelMissing {
                        path: model.display().to_string(),
                    });
                }
                Some(_) => {}
            }
            &selector.svm_rank.binary
        }
        Backend::QuickRank => &selector.quick_rank.binary,
    };
    if binary_missing(binary) {
        warnings.push(ConfigWarning::BinaryMissing {
            backend: selector.backend,
            path: binary.display().to_string(),
        });
    }

    if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
        warnings.push(ConfigWarning::BackoffInverted {
            initial_ms: config.retry.initial_backoff_ms,
            max_ms: config.retry.max_backoff_ms,
        });
    }

    warnings
}

/// Returns true if `binary` is a path that does not exist.
fn binary_missing(binary: &Path) -> bool {
    let bare = binary.to_str().is_some_and(is_bare_name);
    !bare && !binary.exists()
}
