//! Path resolution for configured files and executables.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a configured file path.
///
/// - `~` and `~/...` expand to the home directory
/// - relative paths are joined onto `config_dir`, the directory of the defining file
/// - absolute paths are returned unchanged
///
/// The path does not have to exist.
pub fn resolve_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(config_dir.join(expanded))
    }
}

/// Resolves a configured executable.
///
/// A bare name such as `svm_rank_classify` is left alone so that it is looked up on `PATH`.
/// Anything containing a path separator is resolved like [`resolve_path`].
pub fn resolve_binary(binary: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    if is_bare_name(binary) {
        Ok(PathBuf::from(binary))
    } else {
        resolve_path(binary, config_dir)
    }
}

/// Returns true if `binary` names a program rather than a path.
pub fn is_bare_name(binary: &str) -> bool {
    !binary.starts_with('~') && !binary.contains(['/', '\\'])
}

/// Expands a leading `~` to the home directory.
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}
