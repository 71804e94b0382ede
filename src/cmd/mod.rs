//! Command module structure for dimcheck CLI

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use dimcheck::config::Config;
use dimcheck::evaluate::{evaluate, Evaluation};
use dimcheck::import::{load_table, ImportFormat};
use dimcheck::paths::TEMPLATES_DIR;

pub mod check;
pub mod config;
pub mod entry;
pub mod init;
pub mod report;
pub mod template;
pub mod util;

/// Import `file` and evaluate it with the configured column aliases and policy.
pub fn load_and_evaluate(
    file: &Path,
    input_format: Option<&str>,
    config: &Config,
) -> Result<Evaluation> {
    let format = input_format
        .map(|f| f.parse::<ImportFormat>())
        .transpose()?;

    let table = load_table(file, format, config.import.delimiter_byte())?;
    let evaluation = evaluate(&table, &config.evaluate_options())
        .with_context(|| format!("Cannot evaluate {}", file.display()))?;

    Ok(evaluation)
}

/// Project template override directory, when present.
pub fn templates_dir() -> Option<PathBuf> {
    let dir = PathBuf::from(TEMPLATES_DIR);
    dir.is_dir().then_some(dir)
}
