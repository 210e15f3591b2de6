//! Configuration file parsing.
//!
//! Parses individual `.refine.toml` files into `Raw*` structures in which every field is
//! optional, so that partial files can be merged.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here and ignore parent and global configs.
    pub root: Option<bool>,
    /// `[refinement]` section.
    pub refinement: Option<RawRefinementSettings>,
    /// `[selector]` section.
    pub selector: Option<RawSelectorSettings>,
    /// `[retry]` section.
    pub retry: Option<RawRetrySettings>,
}

/// Raw refinement loop settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRefinementSettings {
    /// Number of selections before the loop stops.
    pub stopping_threshold: Option<u32>,
    /// Transformation names; a single string or an array.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub transformations: Option<Vec<String>>,
}

/// Raw selector settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSelectorSettings {
    /// Backend name (`svm_rank` or `quick_rank`).
    pub backend: Option<String>,
    /// `[selector.svm_rank]` section.
    pub svm_rank: Option<RawSvmRankSettings>,
    /// `[selector.quick_rank]` section.
    pub quick_rank: Option<RawQuickRankSettings>,
}

/// Raw SVM-rank settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSvmRankSettings {
    /// Classifier executable.
    pub binary: Option<String>,
    /// Trained model file.
    pub model: Option<String>,
}

/// Raw QuickRank settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawQuickRankSettings {
    /// QuickRank executable.
    pub binary: Option<String>,
    /// Score file name.
    pub scores: Option<String>,
    /// Extra command-line arguments, passed as `--key value`.
    pub arguments: Option<BTreeMap<String, toml::Value>>,
}

/// Raw retry settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRetrySettings {
    /// Total attempts per ranker invocation.
    pub max_attempts: Option<u32>,
    /// First backoff delay in milliseconds.
    pub initial_backoff_ms: Option<u64>,
    /// Upper bound on any backoff delay in milliseconds.
    pub max_backoff_ms: Option<u64>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string. `path` is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> RawConfig {
        parse_config_str(toml, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn empty_config() {
        let config = parse("");
        assert!(config.root.is_none());
        assert!(config.refinement.is_none());
        assert!(config.selector.is_none());
        assert!(config.retry.is_none());
    }

    #[test]
    fn refinement_section() {
        let config = parse(
            r#"
[refinement]
stopping_threshold = 8
transformations = ["adjacency_range", "mesh_explosion"]
"#,
        );
        let refinement = config.refinement.unwrap();
        assert_eq!(refinement.stopping_threshold, Some(8));
        assert_eq!(
            refinement.transformations,
            Some(vec!["adjacency_range".to_string(), "mesh_explosion".to_string()])
        );
    }

    #[test]
    fn single_transformation_string() {
        let config = parse("[refinement]\ntransformations = \"field_restrictions\"\n");
        assert_eq!(
            config.refinement.unwrap().transformations,
            Some(vec!["field_restrictions".to_string()])
        );
    }

    #[test]
    fn selector_sections() {
        let config = parse(
            r#"
[selector]
backend = "quick_rank"

[selector.svm_rank]
model = "models/svm.dat"

[selector.quick_rank]
binary = "/opt/quickrank/bin/quicklearn"
scores = "scores.txt"

[selector.quick_rank.arguments]
algo = "LAMBDAMART"
num-trees = 1000
shrinkage = 0.1
"#,
        );
        let selector = config.selector.unwrap();
        assert_eq!(selector.backend.as_deref(), Some("quick_rank"));
        let svm = selector.svm_rank.unwrap();
        assert!(svm.binary.is_none());
        assert_eq!(svm.model.as_deref(), Some("models/svm.dat"));
        let qr = selector.quick_rank.unwrap();
        assert_eq!(qr.scores.as_deref(), Some("scores.txt"));
        let arguments = qr.arguments.unwrap();
        assert_eq!(arguments["algo"].as_str(), Some("LAMBDAMART"));
        assert_eq!(arguments["num-trees"].as_integer(), Some(1000));
    }

    #[test]
    fn retry_section() {
        let config = parse("[retry]\nmax_attempts = 5\nmax_backoff_ms = 250\n");
        let retry = config.retry.unwrap();
        assert_eq!(retry.max_attempts, Some(5));
        assert!(retry.initial_backoff_ms.is_none());
        assert_eq!(retry.max_backoff_ms, Some(250));
    }

    #[test]
    fn invalid_toml_reports_path() {
        let err = parse_config_str("[refinement\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(parse_config("[refinement]\nstopping_threshold = \"five\"\n").is_err());
    }
}
