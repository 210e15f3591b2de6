//! Integration tests for refine-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> resolve -> merge.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use refine_config::{Backend, Config, ConfigError, ConfigWarning};
use refine_rewrite::TransformationKind;

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn nested_configs_merge_closest_first() {
    let env = TestEnv::new();
    env.create_file(
        ".refine.toml",
        r#"
root = true

[refinement]
stopping_threshold = 3
transformations = ["adjacency_range"]

[selector.svm_rank]
model = "models/svm.dat"

[selector.quick_rank.arguments]
algo = "LAMBDAMART"
num-trees = 100
"#,
    );
    env.create_file(
        "topics/.refine.toml",
        r#"
[refinement]
stopping_threshold = 9

[selector]
backend = "quick_rank"

[selector.quick_rank.arguments]
num-trees = 250
"#,
    );
    let cwd = env.create_dir("topics/CD008643");

    let config = Config::load(&cwd).unwrap();

    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.config_root, Some(env.path().join("topics")));
    assert_eq!(config.refinement.stopping_threshold, 9);
    assert_eq!(
        config.refinement.transformations,
        vec![TransformationKind::AdjacencyRange]
    );
    assert_eq!(config.selector.backend, Backend::QuickRank);
    assert_eq!(
        config.selector.svm_rank.model,
        Some(env.path().join("models/svm.dat"))
    );
    let arguments = &config.selector.quick_rank.arguments;
    assert_eq!(arguments["algo"], "LAMBDAMART");
    assert_eq!(arguments["num-trees"], "250");
}

#[test]
fn root_config_stops_discovery() {
    let env = TestEnv::new();
    env.create_file(".refine.toml", "[refinement]\nstopping_threshold = 1\n");
    env.create_file("project/.refine.toml", "root = true\n");
    let cwd = env.create_dir("project/sub");

    let config = Config::load(&cwd).unwrap();

    assert_eq!(config.sources, vec![env.path().join("project/.refine.toml")]);
    assert_eq!(config.refinement.stopping_threshold, 5);
}

#[test]
fn load_from_files_reports_parse_errors() {
    let env = TestEnv::new();
    let bad = env.create_file("bad.toml", "[refinement\nstopping_threshold = 1\n");

    let err = Config::load_from_files(&[bad]).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
}

#[test]
fn load_from_files_reports_missing_files() {
    let env = TestEnv::new();
    let err = Config::load_from_files(&[env.path().join("absent.toml")]).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn unknown_backend_is_an_error() {
    let env = TestEnv::new();
    let file = env.create_file(".refine.toml", "root = true\n[selector]\nbackend = \"bm25\"\n");

    let err = Config::load_from_files(&[file]).unwrap_err();
    assert!(err.to_string().contains("bm25"));
}

#[test]
fn validation_checks_model_on_disk() {
    let env = TestEnv::new();
    let file = env.create_file(
        ".refine.toml",
        "root = true\n[selector.svm_rank]\nmodel = \"svm.dat\"\n",
    );

    let config = Config::load_from_files(&[file.clone()]).unwrap();
    assert!(matches!(
        config.validate().as_slice(),
        [ConfigWarning::ModelMissing { .. }]
    ));

    env.create_file("svm.dat", "model");
    let config = Config::load_from_files(&[file]).unwrap();
    assert!(config.validate().is_empty());
}

#[test]
fn effective_settings_round_trip_through_toml() {
    let env = TestEnv::new();
    let file = env.create_file(
        ".refine.toml",
        r#"
root = true

[refinement]
transformations = ["mesh_explosion", "field_restrictions"]

[selector.quick_rank]
scores = "out.txt"

[selector.quick_rank.arguments]
algo = "LAMBDAMART"
"#,
    );
    let config = Config::load_from_files(&[file]).unwrap();
    let rendered = config.settings_to_toml().unwrap();

    let copy = env.create_file("copy/.refine.toml", &rendered);
    let reloaded = Config::load_from_files(&[copy]).unwrap();
    assert_eq!(reloaded.refinement, config.refinement);
    assert_eq!(reloaded.selector.backend, config.selector.backend);
    assert_eq!(reloaded.selector.quick_rank, config.selector.quick_rank);
    assert_eq!(reloaded.retry, config.retry);
}
