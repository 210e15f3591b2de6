//! Implementation of `refine variants`.

use std::process::ExitCode;

use refine_learning::{Candidate, variations};

use super::shared::{NO_TOPIC, parse_query};
use crate::cli::{
    args::VariantsCommand,
    context::CommandContext,
    output::{JsonVariant, fail, print_json, transformation_name, variants_table},
};

/// Lists the variants of a query.
pub fn run(ctx: &CommandContext, cmd: &VariantsCommand) -> ExitCode {
    let query = match parse_query(&cmd.query) {
        Ok(query) => query,
        Err(code) => return code,
    };
    let kinds = ctx.transformations(&cmd.transformations.transformations);

    let variants = match variations(&Candidate::seed(NO_TOPIC, query), &kinds) {
        Ok(variants) => variants,
        Err(e) => return fail(&e),
    };

    if cmd.json {
        let json: Vec<_> = variants
            .iter()
            .map(|v| JsonVariant {
                transformation: transformation_name(v, &kinds),
                query: v.query.to_query_string(),
                tree: &v.query,
            })
            .collect();
        return print_json(&json);
    }

    if variants.is_empty() {
        println!("No variants.");
        return ExitCode::SUCCESS;
    }
    println!("{}", variants_table(&variants, &kinds));
    ExitCode::SUCCESS
}
