//! Implementation of `refine check`.

use std::process::ExitCode;

use refine_config::{Backend, ConfigWarning, discover_config_files};

use crate::cli::context::CommandContext;

/// Loads configuration and reports validation warnings.
///
/// Exits with failure when there are warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);

    println!("Checking configuration...");
    println!();

    if config_files.is_empty() {
        println!("No configuration files found; using defaults.");
        println!("Run 'refine init' to create a configuration file.");
        println!();
    } else {
        println!("Config files:");
        for path in &config_files {
            println!("  {}", path.display());
        }
        println!();
    }

    let config = &ctx.config;
    let selector = &config.selector;
    let binary = match selector.backend {
        Backend::SvmRank => &selector.svm_rank.binary,
        Backend::QuickRank => &selector.quick_rank.binary,
    };
    println!("Selector: {} ({})", selector.backend, binary.display());
    let names: Vec<_> = config
        .refinement
        .transformations
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("Transformations: {}", names.join(", "));
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("Warnings ({}):", warnings.len());
    for warning in &warnings {
        println!("  - {warning}");
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|warning| match warning {
            ConfigWarning::NoTransformations => {
                "List transformations under [refinement] or remove the empty list."
            }
            ConfigWarning::ZeroThreshold => "Set [refinement] stopping_threshold to at least 1.",
            ConfigWarning::ModelNotConfigured | ConfigWarning::ModelMissing { .. } => {
                "Point [selector.svm_rank] model at a model trained with svm_rank_learn."
            }
            ConfigWarning::BinaryMissing { .. } => {
                "Fix the binary path or use a bare name to search PATH."
            }
            ConfigWarning::BackoffInverted { .. } => {
                "Make initial_backoff_ms no larger than max_backoff_ms."
            }
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    if !hints.is_empty() {
        println!("Hints:");
        for hint in hints {
            println!("  - {hint}");
        }
    }
}
