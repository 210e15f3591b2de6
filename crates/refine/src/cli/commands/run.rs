//! Implementation of `refine run`.

use std::process::ExitCode;

use refine_learning::{Candidate, Refiner, StructuralFeatures};

use super::shared::parse_query;
use crate::cli::{
    args::RunCommand,
    context::CommandContext,
    output::{fail, print_json, refinement_table},
};

/// Refines a seed query with the configured ranker.
pub fn run(ctx: &CommandContext, cmd: &RunCommand) -> ExitCode {
    let query = match parse_query(&cmd.query) {
        Ok(query) => query,
        Err(code) => return code,
    };
    let kinds = ctx.transformations(&cmd.transformations.transformations);
    let selector = match ctx.selector(cmd.backend, cmd.threshold) {
        Ok(selector) => selector,
        Err(code) => return code,
    };

    let mut refiner = Refiner::new(kinds.clone(), Box::new(StructuralFeatures), selector);
    let refinement = match refiner.run(Candidate::seed(&cmd.topic, query)) {
        Ok(refinement) => refinement,
        Err(e) => return fail(&e),
    };

    if cmd.json {
        return print_json(&refinement);
    }

    if !refinement.chain.is_empty() {
        println!("{}", refinement_table(&refinement, &kinds));
    }
    println!(
        "{} iterations, stopped by {:?}",
        refinement.iterations, refinement.reason
    );
    println!("{}", refinement.best.query.to_query_string());
    ExitCode::SUCCESS
}
