//! Implementation of `refine features`.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use refine_learning::Candidate;

use super::shared::{featurized_variants, parse_query};
use crate::cli::{args::FeaturesCommand, context::CommandContext, output::fail};

/// Prints one unlabelled LibSVM-rank line per variant.
///
/// Lines carry the canonical query as a comment, so the output can be labelled by hand and
/// fed to `refine train`.
pub fn run(ctx: &CommandContext, cmd: &FeaturesCommand) -> ExitCode {
    let query = match parse_query(&cmd.query) {
        Ok(query) => query,
        Err(code) => return code,
    };
    let kinds = ctx.transformations(&cmd.transformations.transformations);

    let variants = match featurized_variants(&Candidate::seed(&cmd.topic, query), &kinds) {
        Ok(variants) => variants,
        Err(code) => return code,
    };

    let mut stdout = io::stdout().lock();
    for variant in &variants {
        if let Err(e) = variant.to_learnt_feature().write_libsvm_rank(&mut stdout) {
            return fail(&e);
        }
    }
    if let Err(e) = stdout.flush() {
        return fail(&e);
    }
    ExitCode::SUCCESS
}
