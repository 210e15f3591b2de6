//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules and resolving paths against the file that declared them.

use std::path::{Path, PathBuf};

use refine_rewrite::TransformationKind;

use crate::{
    Backend, Config, ConfigError, RefinementSettings, RetrySettings, SelectorSettings,
    parse::{RawConfig, RawQuickRankSettings, RawRefinementSettings, RawSelectorSettings},
    resolve::{resolve_binary, resolve_path},
};

/// QuickRank arguments whose values are file paths.
const PATH_ARGUMENTS: &[&str] = &["model-in", "model-out"];

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory relative paths in this file are resolved against.
    fn dir(&self) -> Result<&Path, ConfigError> {
        self.path
            .parent()
            .ok_or_else(|| ConfigError::PathResolution {
                path: self.path.clone(),
            })
    }
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins
/// - Transformations: the first file that lists any replaces the whole list
/// - QuickRank arguments: merged, first definition for each key wins
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let refinement = merge_refinement(configs)?;
    let selector = merge_selector(configs)?;
    let retry = merge_retry(configs);
    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);

    Ok(Config {
        refinement,
        selector,
        retry,
        config_root,
        sources: configs.iter().map(|c| c.path.clone()).collect(),
    })
}

/// Merges refinement settings.
fn merge_refinement(configs: &[ParsedConfig]) -> Result<RefinementSettings, ConfigError> {
    let mut result = RefinementSettings::default();

    // Iterate in reverse (lowest precedence first) so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref raw) = parsed.config.refinement {
            apply_raw_refinement(&mut result, raw, &parsed.path)?;
        }
    }

    Ok(result)
}

/// Applies raw refinement settings to result.
fn apply_raw_refinement(
    result: &mut RefinementSettings,
    raw: &RawRefinementSettings,
    path: &Path,
) -> Result<(), ConfigError> {
    if let Some(v) = raw.stopping_threshold {
        result.stopping_threshold = v;
    }
    if let Some(ref names) = raw.transformations {
        result.transformations = names
            .iter()
            .map(|name| parse_transformation(name, path))
            .collect::<Result<_, _>>()?;
    }
    Ok(())
}

/// Parses a transformation name, attributing failures to `path`.
fn parse_transformation(name: &str, path: &Path) -> Result<TransformationKind, ConfigError> {
    name.parse()
        .map_err(|_| ConfigError::UnknownTransformation {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Merges selector settings.
fn merge_selector(configs: &[ParsedConfig]) -> Result<SelectorSettings, ConfigError> {
    let mut result = SelectorSettings::default();

    for parsed in configs.iter().rev() {
        if let Some(ref raw) = parsed.config.selector {
            apply_raw_selector(&mut result, raw, parsed)?;
        }
    }

    Ok(result)
}

/// Applies raw selector settings to result, resolving paths against the declaring file.
fn apply_raw_selector(
    result: &mut SelectorSettings,
    raw: &RawSelectorSettings,
    parsed: &ParsedConfig,
) -> Result<(), ConfigError> {
    if let Some(ref name) = raw.backend {
        result.backend = Backend::from_name(name).ok_or_else(|| ConfigError::UnknownBackend {
            name: name.clone(),
            path: parsed.path.clone(),
        })?;
    }

    if let Some(ref svm) = raw.svm_rank {
        if let Some(ref binary) = svm.binary {
            result.svm_rank.binary = resolve_binary(binary, parsed.dir()?)?;
        }
        if let Some(ref model) = svm.model {
            result.svm_rank.model = Some(resolve_path(model, parsed.dir()?)?);
        }
    }

    if let Some(ref quick) = raw.quick_rank {
        apply_raw_quick_rank(result, quick, parsed)?;
    }

    Ok(())
}

/// Applies raw QuickRank settings. Arguments are merged key by key.
fn apply_raw_quick_rank(
    result: &mut SelectorSettings,
    raw: &RawQuickRankSettings,
    parsed: &ParsedConfig,
) -> Result<(), ConfigError> {
    let quick = &mut result.quick_rank;
    if let Some(ref binary) = raw.binary {
        quick.binary = resolve_binary(binary, parsed.dir()?)?;
    }
    if let Some(ref scores) = raw.scores {
        quick.scores = Some(scores.clone());
    }
    if let Some(ref arguments) = raw.arguments {
        for (key, value) in arguments {
            quick
                .arguments
                .insert(key.clone(), argument_value(key, value, parsed.dir()?)?);
        }
    }
    Ok(())
}

/// Renders an argument value as it is passed on the command line.
fn argument_value(key: &str, value: &toml::Value, dir: &Path) -> Result<String, ConfigError> {
    let text = match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if PATH_ARGUMENTS.contains(&key) {
        Ok(resolve_path(&text, dir)?.to_string_lossy().into_owned())
    } else {
        Ok(text)
    }
}

/// Merges retry settings.
fn merge_retry(configs: &[ParsedConfig]) -> RetrySettings {
    let mut result = RetrySettings::default();

    for raw in configs.iter().rev().filter_map(|p| p.config.retry.as_ref()) {
        if let Some(v) = raw.max_attempts {
            result.max_attempts = v;
        }
        if let Some(v) = raw.initial_backoff_ms {
            result.initial_backoff_ms = v;
        }
        if let Some(v) = raw.max_backoff_ms {
            result.max_backoff_ms = v;
        }
    }

    result
}
