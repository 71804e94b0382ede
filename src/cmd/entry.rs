//! `dimcheck entry`: type measurements in at the terminal.
//!
//! Rows are saved as CSV in the import layout, so the file can be passed to
//! `dimcheck check` or `dimcheck report` afterwards.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use std::fs;
use std::path::{Path, PathBuf};

use dimcheck::config::Config;
use dimcheck::evaluate::evaluate;
use dimcheck::import::csv;
use dimcheck::measurement::coerce_number;
use dimcheck::table::{Column, RawTable};

const DEFAULT_OUTPUT: &str = "measures.csv";

/// Print usage hint for the entry command in non-TTY contexts
fn print_entry_usage_hint() {
    println!("dimcheck entry needs an interactive terminal.\n");
    println!("To work without one, fill in a table and evaluate it:");
    println!("  dimcheck template --output measures.csv");
    println!("  dimcheck check measures.csv\n");
    println!("Run 'dimcheck entry --help' for all options.");
}

pub fn cmd_entry(output: Option<&Path>) -> Result<()> {
    if !atty::is(atty::Stream::Stdin) {
        print_entry_usage_hint();
        return Ok(());
    }

    let config = Config::load()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    if output.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    println!(
        "{}",
        "Enter one characteristic per row. Leave the name empty to finish.".dimmed()
    );

    let mut rows = Vec::new();
    loop {
        let name: String = Input::new()
            .with_prompt(format!("Characteristic #{}", rows.len() + 1))
            .allow_empty(true)
            .interact_text()?;
        if name.trim().is_empty() {
            break;
        }

        rows.push(EnteredRow {
            name,
            nominal: prompt_number("  Nominal", false)?,
            tolerance_minus: prompt_number("  Tolerance-", false)?,
            tolerance_plus: prompt_number("  Tolerance+", false)?,
            measured: prompt_number("  Measured (empty if not measured)", true)?,
        });
    }

    if rows.is_empty() {
        println!("{}", "No rows entered.".dimmed());
        return Ok(());
    }

    let table = rows_to_table(&rows);
    let content = csv::write(&table, config.import.delimiter_byte())?;
    fs::write(&output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{} Saved {} row(s) to {}\n", "✓".green(), rows.len(), output.display());

    let evaluation = evaluate(&table, &config.evaluate_options())?;
    super::check::print_evaluation(&evaluation, config.report.decimals);

    Ok(())
}

/// One row as typed, numbers kept as entered
#[derive(Debug, Clone)]
struct EnteredRow {
    name: String,
    nominal: String,
    tolerance_minus: String,
    tolerance_plus: String,
    measured: String,
}

fn prompt_number(prompt: &str, allow_empty: bool) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .validate_with(|input: &String| -> Result<(), String> {
            if number_accepted(input, allow_empty) {
                Ok(())
            } else {
                Err(format!("'{}' is not a number", input.trim()))
            }
        })
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn number_accepted(input: &str, allow_empty: bool) -> bool {
    (allow_empty && input.trim().is_empty()) || coerce_number(input).is_some()
}

fn rows_to_table(rows: &[EnteredRow]) -> RawTable {
    let mut table = RawTable::new(
        Column::REQUIRED
            .iter()
            .map(|c| c.header().to_string())
            .collect(),
    );
    for row in rows {
        table.push_row(vec![
            row.name.trim().to_string(),
            row.nominal.clone(),
            row.tolerance_minus.clone(),
            row.tolerance_plus.clone(),
            row.measured.clone(),
        ]);
    }
    table
}
