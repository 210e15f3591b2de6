//! Implementation of `refine init`.

use std::{fs, path::PathBuf, process::ExitCode};

use refine_config::{CONFIG_FILENAME, global_config_path, global_template, local_template};

use crate::cli::{args::InitCommand, context::CommandContext, output::fail};

/// Writes a commented `.refine.toml` template.
///
/// Running in the home directory writes the global template, as does `--global`.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let global = global_config_path();
    let in_home = global.as_deref().and_then(|p| p.parent()) == Some(ctx.cwd.as_path());
    let use_global = cmd.global || in_home;

    let target: PathBuf = if use_global {
        match global {
            Some(path) => path,
            None => return fail(&"could not determine home directory"),
        }
    } else {
        ctx.cwd.join(CONFIG_FILENAME)
    };

    if target.exists() && !cmd.force {
        eprintln!("error: configuration file already exists: {}", target.display());
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    let template = if use_global {
        global_template()
    } else {
        local_template()
    };
    if let Err(e) = fs::write(&target, template) {
        return fail(&format!("failed to write {}: {e}", target.display()));
    }

    println!("Created {}", target.display());
    println!("Uncomment the settings you need, then run 'refine check'.");
    ExitCode::SUCCESS
}
