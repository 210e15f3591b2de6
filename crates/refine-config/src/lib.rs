//! Configuration system for refine.
//!
//! refine reads TOML files named `.refine.toml`. Files are collected by walking up from the
//! current directory, stopping at one that sets `root = true`, and `~/.refine.toml` is
//! loaded last with the lowest precedence. For every setting the first file that defines it
//! wins.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawQuickRankSettings, RawRefinementSettings, RawRetrySettings,
    RawSelectorSettings, RawSvmRankSettings, parse_config_file, parse_config_str,
};
use refine_rewrite::{Transformation, TransformationKind};
pub use resolve::{is_bare_name, resolve_binary, resolve_path};
use serde::{Serialize, Serializer};
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Refinement loop settings.
    pub refinement: RefinementSettings,
    /// Candidate selector settings.
    pub selector: SelectorSettings,
    /// Retry settings for ranker invocations.
    pub retry: RetrySettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
    /// Every file that contributed, highest precedence first.
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Discovers, parses, and merges every `.refine.toml` that applies to `cwd`.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        Self::load_from_files(&discover_config_files(cwd))
    }

    /// Loads configuration from explicit files, highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                Ok(ParsedConfig {
                    path: path.clone(),
                    config: parse_config_file(path)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Renders the effective settings in `.refine.toml` form.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let effective = EffectiveSettings {
            refinement: &self.refinement,
            selector: &self.selector,
            retry: &self.retry,
        };
        Ok(toml::to_string_pretty(&effective)?)
    }
}

/// Borrowed view of the settings for TOML output.
#[derive(Serialize)]
struct EffectiveSettings<'a> {
    /// `[refinement]`.
    refinement: &'a RefinementSettings,
    /// `[selector]`.
    selector: &'a SelectorSettings,
    /// `[retry]`.
    retry: &'a RetrySettings,
}

/// Settings for the refinement loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefinementSettings {
    /// Number of selections before the loop stops.
    pub stopping_threshold: u32,
    /// Transformations applied at every step, in order.
    #[serde(serialize_with = "serialize_kinds")]
    pub transformations: Vec<TransformationKind>,
}

impl Default for RefinementSettings {
    fn default() -> Self {
        Self {
            stopping_threshold: 5,
            transformations: TransformationKind::ALL.to_vec(),
        }
    }
}

/// Serializes transformations by name.
fn serialize_kinds<S: Serializer>(
    kinds: &[TransformationKind],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(kinds.iter().map(|kind| kind.name()))
}

/// The external ranker used to select candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// `svm_rank_classify` with a pre-trained model.
    #[default]
    SvmRank,
    /// QuickRank, typically LambdaMART.
    QuickRank,
}

impl Backend {
    /// Every backend.
    pub const ALL: [Self; 2] = [Self::SvmRank, Self::QuickRank];

    /// Returns the config name of this backend.
    pub fn name(self) -> &'static str {
        match self {
            Self::SvmRank => "svm_rank",
            Self::QuickRank => "quick_rank",
        }
    }

    /// Looks up a backend by config name, ignoring case and treating `-` as `_`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|b| b.name() == normalized)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Candidate selector settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SelectorSettings {
    /// Which backend to use.
    pub backend: Backend,
    /// SVM-rank settings.
    pub svm_rank: SvmRankSettings,
    /// QuickRank settings.
    pub quick_rank: QuickRankSettings,
}

/// SVM-rank backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SvmRankSettings {
    /// Classifier executable.
    pub binary: PathBuf,
    /// Trained model file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<PathBuf>,
}

impl Default for SvmRankSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("svm_rank_classify"),
            model: None,
        }
    }
}

impl SvmRankSettings {
    /// Returns the model path, which SVM-rank cannot run without.
    pub fn model(&self) -> Result<&Path, ConfigError> {
        self.model
            .as_deref()
            .ok_or(ConfigError::MissingSetting {
                key: "selector.svm_rank.model",
                hint: "set it to a model trained with svm_rank_learn",
            })
    }
}

/// QuickRank backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickRankSettings {
    /// QuickRank executable.
    pub binary: PathBuf,
    /// Score file name; only the file name is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<String>,
    /// Extra arguments, passed as `--key value` in key order.
    pub arguments: BTreeMap<String, String>,
}

impl Default for QuickRankSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("quicklearn"),
            scores: None,
            arguments: BTreeMap::new(),
        }
    }
}

impl QuickRankSettings {
    /// Returns the arguments to invoke QuickRank with, including `scores` when set.
    pub fn command_arguments(&self) -> BTreeMap<String, String> {
        let mut arguments = self.arguments.clone();
        if let Some(scores) = &self.scores {
            arguments.insert("scores".to_string(), scores.clone());
        }
        arguments
    }
}

/// Retry settings for ranker invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetrySettings {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// First backoff delay in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound on any backoff delay in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 2_000,
        }
    }
}

impl RetrySettings {
    /// Returns the first backoff delay.
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Returns the maximum backoff delay.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.refinement.stopping_threshold, 5);
        assert_eq!(config.refinement.transformations, TransformationKind::ALL);
        assert_eq!(config.selector.backend, Backend::SvmRank);
        assert_eq!(config.selector.svm_rank.binary, PathBuf::from("svm_rank_classify"));
        assert_eq!(config.selector.quick_rank.binary, PathBuf::from("quicklearn"));
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.config_root.is_none());
    }

    #[test]
    fn backend_names() {
        assert_eq!(Backend::from_name("svm_rank"), Some(Backend::SvmRank));
        assert_eq!(Backend::from_name("Quick-Rank"), Some(Backend::QuickRank));
        assert_eq!(Backend::from_name("ranklib"), None);
        assert_eq!(Backend::QuickRank.to_string(), "quick_rank");
    }

    #[test]
    fn missing_model_is_an_error() {
        let err = SvmRankSettings::default().model().unwrap_err();
        assert!(err.to_string().contains("selector.svm_rank.model"));
    }

    #[test]
    fn scores_setting_overrides_argument() {
        let settings = QuickRankSettings {
            scores: Some("mine.txt".into()),
            arguments: BTreeMap::from([
                ("scores".to_string(), "theirs.txt".to_string()),
                ("algo".to_string(), "LAMBDAMART".to_string()),
            ]),
            ..Default::default()
        };
        let arguments = settings.command_arguments();
        assert_eq!(arguments["scores"], "mine.txt");
        assert_eq!(arguments["algo"], "LAMBDAMART");
    }

    #[test]
    fn settings_to_toml() {
        let mut config = Config::default();
        config.selector.quick_rank.arguments.insert("algo".into(), "LAMBDAMART".into());
        let toml = config.settings_to_toml().unwrap();

        assert!(toml.contains("[refinement]"));
        assert!(toml.contains("stopping_threshold = 5"));
        assert!(toml.contains("\"logical_operator_replacement\""));
        assert!(toml.contains("backend = \"svm_rank\""));
        assert!(toml.contains("[selector.quick_rank.arguments]"));
        assert!(toml.contains("[retry]"));

        let reparsed = parse_config_str(&toml, Path::new("effective.toml")).unwrap();
        assert_eq!(reparsed.refinement.unwrap().stopping_threshold, Some(5));
    }
}
