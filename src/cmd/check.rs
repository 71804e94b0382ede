//! `dimcheck check`: evaluate a table and print the verdicts.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use dimcheck::config::Config;
use dimcheck::evaluate::{Evaluation, Summary, UndefinedPolicy};
use dimcheck::formatters::{format_evaluation_table, format_summary, format_warnings};
use dimcheck::ui;

pub fn cmd_check(file: &Path, input_format: Option<&str>, json: bool, strict: bool) -> Result<()> {
    let config = Config::load()?;
    let evaluation = super::load_and_evaluate(file, input_format, &config)?;

    if json {
        let output =
            serde_json::to_string_pretty(&evaluation).context("Failed to serialize evaluation")?;
        println!("{}", output);
    } else {
        print_evaluation(&evaluation, config.report.decimals);
    }

    if strict && !strict_pass(&evaluation.summary) {
        std::process::exit(1);
    }

    Ok(())
}

/// No row failed and none is undetermined.
pub fn strict_pass(summary: &Summary) -> bool {
    summary.failing == 0 && summary.undetermined == 0
}

/// Print the table, warnings and summary line. Quiet mode prints only the summary.
pub fn print_evaluation(evaluation: &Evaluation, decimals: usize) {
    if evaluation.is_empty() {
        println!("{}", ui::colors::secondary("No rows to evaluate."));
        return;
    }

    if !ui::is_quiet() {
        println!("{}", format_evaluation_table(evaluation, decimals));
        println!();
        for line in format_warnings(evaluation) {
            eprintln!("{}", line);
        }
    }

    println!("{}", format_summary(&evaluation.summary));

    if evaluation.summary.undetermined > 0 && !ui::is_quiet() {
        println!(
            "{}",
            format!(
                "Undetermined rows are {} (evaluation.undefined_policy: {})",
                match evaluation.summary.policy {
                    UndefinedPolicy::Exclude => "excluded from the counts",
                    UndefinedPolicy::Fail => "counted as failing",
                },
                evaluation.summary.policy
            )
            .dimmed()
        );
    }
}
