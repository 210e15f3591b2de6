//! Clap argument definitions for the `refine` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use refine_config::Backend;
use refine_rewrite::TransformationKind;

/// Parses a transformation name.
fn parse_transformation(s: &str) -> Result<TransformationKind, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Parses a selector backend name.
fn parse_backend(s: &str) -> Result<Backend, String> {
    Backend::from_name(s).ok_or_else(|| format!("expected svm_rank or quick_rank, found '{s}'"))
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "refine")]
#[command(about = "Refine Boolean search strategies by learning to rank query rewrites")]
pub struct Cli {
    /// Log more (-v for progress, -vv for ranker output)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared transformation selection flags.
#[derive(Args, Debug, Clone, Default)]
pub struct TransformationArgs {
    /// Transformation to apply (repeatable) [default: from configuration]
    #[arg(short = 't', long = "transformation", value_parser = parse_transformation)]
    pub transformations: Vec<TransformationKind>,
}

/// Arguments for `refine parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query to parse
    pub query: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `refine variants`.
#[derive(Args, Debug, Clone)]
pub struct VariantsCommand {
    /// Query to rewrite
    pub query: String,

    #[command(flatten)]
    /// Transformation overrides.
    pub transformations: TransformationArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `refine features`.
#[derive(Args, Debug, Clone)]
pub struct FeaturesCommand {
    /// Query to rewrite
    pub query: String,

    /// Topic identifier written as the qid
    #[arg(long)]
    pub topic: String,

    #[command(flatten)]
    /// Transformation overrides.
    pub transformations: TransformationArgs,
}

/// Arguments for `refine run`.
#[derive(Args, Debug, Clone)]
pub struct RunCommand {
    /// Seed query
    pub query: String,

    /// Topic identifier
    #[arg(long)]
    pub topic: String,

    /// Stop after this many selections [default: from configuration]
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Ranker backend: svm_rank or quick_rank [default: from configuration]
    #[arg(short = 'b', long, value_parser = parse_backend)]
    pub backend: Option<Backend>,

    #[command(flatten)]
    /// Transformation overrides.
    pub transformations: TransformationArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `refine train`.
#[derive(Args, Debug, Clone)]
pub struct TrainCommand {
    /// LibSVM-rank training file
    pub file: PathBuf,

    /// Write the model bytes here
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Ranker backend: svm_rank or quick_rank [default: from configuration]
    #[arg(short = 'b', long, value_parser = parse_backend)]
    pub backend: Option<Backend>,
}

/// Arguments for `refine init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.refine.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `refine` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a query and show its tree
    #[command(after_help = "\
QUERY SYNTAX:
  cancer                       Keyword
  \"breast cancer\"              Quoted keyword
  cancer[title,text]           Keyword restricted to fields
  Neoplasms[mesh_headings]{exploded=true}
                               Keyword with options
  a AND b, a OR b, a NOT b     Boolean operators
  a ADJ3 b                     Operands within 3 words
  (a AND b) OR c               Grouping; required when operators differ")]
    Parse(ParseCommand),

    /// List the variants every transformation produces
    Variants(VariantsCommand),

    /// Print LibSVM-rank feature lines for every variant
    Features(FeaturesCommand),

    /// Refine a query with the configured ranker
    Run(RunCommand),

    /// Train a ranking model from LibSVM-rank lines
    Train(TrainCommand),

    /// Initialize refine configuration in current directory
    Init(InitCommand),

    /// Validate configuration and diagnose issues
    Check,

    /// Show effective configuration settings
    Config,
}
