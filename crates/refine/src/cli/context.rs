//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use refine_config::{Backend, Config, RetrySettings};
use refine_learning::{CandidateSelector, QuickRankSelector, RetryPolicy, SvmRankSelector};
use refine_rewrite::TransformationKind;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used by `init`, which must work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Returns `overrides` if any were given, otherwise the configured transformations.
    pub fn transformations(&self, overrides: &[TransformationKind]) -> Vec<TransformationKind> {
        if overrides.is_empty() {
            self.config.refinement.transformations.clone()
        } else {
            overrides.to_vec()
        }
    }

    /// Builds the selector for `backend`, or the configured backend.
    pub fn selector(
        &self,
        backend: Option<Backend>,
        threshold: Option<u32>,
    ) -> Result<Box<dyn CandidateSelector>, ExitCode> {
        let settings = &self.config.selector;
        let policy = retry_policy(&self.config.retry);
        let threshold = threshold.unwrap_or(self.config.refinement.stopping_threshold);

        match backend.unwrap_or(settings.backend) {
            Backend::SvmRank => {
                let model = settings.svm_rank.model().map_err(|e| {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                })?;
                Ok(Box::new(
                    SvmRankSelector::new(&settings.svm_rank.binary, model)
                        .with_policy(policy)
                        .with_threshold(threshold),
                ))
            }
            Backend::QuickRank => Ok(Box::new(
                QuickRankSelector::new(
                    &settings.quick_rank.binary,
                    settings.quick_rank.command_arguments(),
                )
                .with_policy(policy)
                .with_threshold(threshold),
            )),
        }
    }
}

/// Converts configured retry settings into a policy.
fn retry_policy(retry: &RetrySettings) -> RetryPolicy {
    RetryPolicy {
        max_attempts: retry.max_attempts,
        initial_backoff: retry.initial_backoff(),
        max_backoff: retry.max_backoff(),
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
