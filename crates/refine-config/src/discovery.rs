//! Configuration file discovery.
//!
//! Walks from the working directory towards the filesystem root collecting `.refine.toml`
//! files, then falls back to the global `~/.refine.toml`.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".refine.toml";

/// Returns every configuration file that applies to `cwd`, highest precedence first.
///
/// Discovery stops at the first file that sets `root = true`; the global file is only
/// appended when no such file was found. Returns an empty vector if nothing is found.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let is_root = is_root_config(&candidate);
        configs.push(candidate);
        if is_root {
            return configs;
        }
    }

    if let Some(global) = global_config_path()
        && global.is_file()
        && !configs.contains(&global)
    {
        configs.push(global);
    }

    configs
}

/// Returns the path of the global configuration file, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Returns true if `path` is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_support::TestDir;

    /// Drops the global config, which depends on the machine running the tests.
    fn local(configs: &[PathBuf]) -> Vec<&PathBuf> {
        configs.iter().filter(|p| !is_global_config(p)).collect()
    }

    #[test]
    fn nothing_found() {
        let dir = TestDir::new();
        let cwd = dir.create_dir("a/b");
        assert!(local(&discover_config_files(&cwd)).is_empty());
    }

    #[test]
    fn closest_config_comes_first() {
        let dir = TestDir::new();
        let top = dir.create_config_at_root();
        let mid = dir.create_config("a");
        let cwd = dir.create_dir("a/b/c");

        let configs = discover_config_files(&cwd);

        assert_eq!(local(&configs), vec![&mid, &top]);
    }

    #[test]
    fn config_in_cwd_is_found() {
        let dir = TestDir::new();
        let config = dir.create_config_at_root();
        assert_eq!(local(&discover_config_files(dir.path())), vec![&config]);
    }

    #[test]
    fn directories_named_like_configs_are_skipped() {
        let dir = TestDir::new();
        fs::create_dir_all(dir.path().join(CONFIG_FILENAME)).unwrap();
        let cwd = dir.create_dir("sub");
        assert!(local(&discover_config_files(&cwd)).is_empty());
    }

    #[test]
    fn root_config_stops_the_walk() {
        let dir = TestDir::new();
        dir.create_config_at_root();
        let root = dir.create_root_config("project");
        let child = dir.create_config("project/sub");
        let cwd = dir.create_dir("project/sub/deep");

        let configs = discover_config_files(&cwd);

        assert_eq!(configs, vec![child, root]);
    }

    #[test]
    fn root_false_keeps_walking() {
        let dir = TestDir::new();
        let top = dir.create_config_at_root();
        let mid = dir.create_config_with_content("project", "root = false\n");
        let cwd = dir.create_dir("project/src");

        assert_eq!(local(&discover_config_files(&cwd)), vec![&mid, &top]);
    }

    #[test]
    fn global_path_uses_config_filename() {
        let path = global_config_path().unwrap();
        assert!(path.ends_with(CONFIG_FILENAME));
        assert!(is_global_config(&path));
        assert!(!is_global_config(Path::new("/elsewhere/.refine.toml")));
    }
}
