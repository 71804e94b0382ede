//! CLI argument definitions for dimcheck.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dimcheck")]
#[command(version)]
#[command(about = "Dimensional conformity checks and inspection reports", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    dimcheck template -o measures.csv   Write a measurement table to fill in\n    dimcheck check measures.csv          Evaluate conformity\n    dimcheck report measures.csv         Write the inspection report (PV)"
)]
pub struct Cli {
    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log debug detail to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize dimcheck in the current directory
    ///
    /// Creates .dimcheck/config.md with default settings and an empty
    /// .dimcheck/templates/ directory for report template overrides.
    Init {
        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing .dimcheck/config.md
        #[arg(long)]
        force: bool,
    },
    /// Evaluate a measurement table and print the verdict of each row
    Check {
        /// Measurement table (csv, tsv, json, yaml)
        file: PathBuf,
        /// Input format, when the extension does not tell
        #[arg(long, value_name = "FORMAT")]
        input_format: Option<String>,
        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
        /// Exit with status 1 when any row is non-conforming or undetermined
        #[arg(long)]
        strict: bool,
    },
    /// Evaluate a measurement table and write the inspection report
    Report {
        /// Measurement table (csv, tsv, json, yaml)
        file: PathBuf,
        /// Input format, when the extension does not tell
        #[arg(long, value_name = "FORMAT")]
        input_format: Option<String>,
        /// Comma-separated report formats: docx, pdf, markdown, csv, json, none
        #[arg(long, short, value_name = "FORMATS")]
        format: Option<String>,
        /// Operator who took the measurements
        #[arg(long)]
        operator: Option<String>,
        /// Part reference
        #[arg(long)]
        part: Option<String>,
        /// Order reference
        #[arg(long)]
        order: Option<String>,
        /// Free-text comment
        #[arg(long)]
        comment: Option<String>,
        /// Reference drawing (png, jpeg or pdf)
        #[arg(long, value_name = "PATH")]
        drawing: Option<PathBuf>,
        /// Output directory (overrides report.output_dir)
        #[arg(long, short, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Write the blank import template
    Template {
        /// Output file (prints to stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },
    /// Enter measurements interactively
    Entry {
        /// CSV file the entered rows are saved to
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config,
    /// Show version information
    Version,
    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_args() {
        let cli = Cli::try_parse_from([
            "dimcheck",
            "report",
            "measures.csv",
            "--format",
            "pdf,md",
            "--operator",
            "J. Martin",
            "--quiet",
        ])
        .unwrap();

        assert!(cli.quiet);
        match cli.command {
            Commands::Report {
                file,
                format,
                operator,
                drawing,
                ..
            } => {
                assert_eq!(file, PathBuf::from("measures.csv"));
                assert_eq!(format.as_deref(), Some("pdf,md"));
                assert_eq!(operator.as_deref(), Some("J. Martin"));
                assert!(drawing.is_none());
            }
            _ => panic!("expected report command"),
        }
    }
}
