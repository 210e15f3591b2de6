//! Error types for refine configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use toml::{de, ser};

/// Errors that can occur when loading or processing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// Failed to render settings as TOML.
    #[error("failed to serialize settings: {0}")]
    SerializeToml(#[from] ser::Error),

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,

    /// A path could not be resolved against its config file.
    #[error("failed to resolve path {path}")]
    PathResolution {
        /// The path that could not be resolved.
        path: PathBuf,
    },

    /// A transformation name is not recognised.
    #[error("unknown transformation '{name}' in {path}")]
    UnknownTransformation {
        /// The unrecognised name.
        name: String,
        /// The config file it appeared in.
        path: PathBuf,
    },

    /// A selector backend name is not recognised.
    #[error("unknown selector backend '{name}' in {path} (expected svm_rank or quick_rank)")]
    UnknownBackend {
        /// The unrecognised name.
        name: String,
        /// The config file it appeared in.
        path: PathBuf,
    },

    /// A setting required for the requested operation is not configured.
    #[error("missing setting {key}: {hint}")]
    MissingSetting {
        /// Dotted key of the setting, such as `selector.svm_rank.model`.
        key: &'static str,
        /// How to provide it.
        hint: &'static str,
    },
}
