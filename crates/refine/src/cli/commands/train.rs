//! Implementation of `refine train`.

use std::{fs, process::ExitCode};

use refine_learning::LearntFeature;

use crate::cli::{args::TrainCommand, context::CommandContext, output::fail};

/// Trains a model from a LibSVM-rank file with the configured ranker.
pub fn run(ctx: &CommandContext, cmd: &TrainCommand) -> ExitCode {
    let contents = match fs::read_to_string(&cmd.file) {
        Ok(contents) => contents,
        Err(e) => return fail(&format!("failed to read {}: {e}", cmd.file.display())),
    };
    let features = match parse_training_lines(&contents) {
        Ok(features) => features,
        Err(message) => return fail(&format!("{}: {message}", cmd.file.display())),
    };

    let selector = match ctx.selector(cmd.backend, None) {
        Ok(selector) => selector,
        Err(code) => return code,
    };
    let model = match selector.train(&features) {
        Ok(model) => model,
        Err(e) => return fail(&e),
    };

    match &cmd.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &model) {
                return fail(&format!("failed to write {}: {e}", path.display()));
            }
            println!("Wrote {} bytes to {}", model.len(), path.display());
        }
        None => println!("Trained on {} records, model is {} bytes", features.len(), model.len()),
    }
    ExitCode::SUCCESS
}

/// Parses training records, skipping blank lines and `#` comments.
fn parse_training_lines(contents: &str) -> Result<Vec<LearntFeature>, String> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| line.parse().map_err(|e| format!("line {}: {e}", i + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_comment_lines() {
        let records =
            parse_training_lines("# header\n\n2 qid:T1 1:0.5 2:3 # a\n0 qid:T1 1:1\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, Some(2.0));
        assert_eq!(records[1].topic, "T1");
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_training_lines("1 qid:T1 1:1\n\nbad\n").unwrap_err();
        assert!(err.starts_with("line 3:"), "{err}");
    }
}
