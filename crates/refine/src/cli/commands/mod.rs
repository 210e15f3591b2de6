//! Command implementations and dispatch.

pub mod check;
pub mod config;
pub mod features;
pub mod init;
pub mod parse;
pub mod run;
mod shared;
pub mod train;
pub mod variants;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Parse(cmd) => parse::run(&cmd),
        Commands::Variants(cmd) => variants::run(ctx, &cmd),
        Commands::Features(cmd) => features::run(ctx, &cmd),
        Commands::Run(cmd) => run::run(ctx, &cmd),
        Commands::Train(cmd) => train::run(ctx, &cmd),
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Check => check::run(ctx),
        Commands::Config => config::run(ctx),
    }
}
