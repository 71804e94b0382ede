//! Table importers.
//!
//! Supported inputs are delimited text (CSV/TSV) and record arrays in JSON or
//! YAML. Every importer yields a [`RawTable`] of text cells; numeric coercion
//! happens later, in the evaluator, so a bad cell never aborts an import.

pub mod csv;
pub mod records;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::table::{Column, RawTable};

/// Input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Csv,
    Tsv,
    Json,
    Yaml,
}

impl ImportFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "txt" => Ok(ImportFormat::Csv),
            "tsv" | "tab" => Ok(ImportFormat::Tsv),
            "json" => Ok(ImportFormat::Json),
            "yaml" | "yml" => Ok(ImportFormat::Yaml),
            "xlsx" | "xls" | "ods" => anyhow::bail!(
                "Spreadsheet files are not read directly: {}\n\n\
                 Save the sheet as CSV (File > Save As > CSV UTF-8) and import that file,\n\
                 or run `dimcheck template` for a ready-made CSV layout.",
                path.display()
            ),
            _ => anyhow::bail!(
                "Cannot detect the format of {}. Use --input-format (csv, tsv, json, yaml).",
                path.display()
            ),
        }
    }
}

impl FromStr for ImportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "tsv" => Ok(ImportFormat::Tsv),
            "json" => Ok(ImportFormat::Json),
            "yaml" | "yml" => Ok(ImportFormat::Yaml),
            _ => anyhow::bail!("Unknown input format: {}. Supported formats: csv, tsv, json, yaml", s),
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFormat::Csv => write!(f, "csv"),
            ImportFormat::Tsv => write!(f, "tsv"),
            ImportFormat::Json => write!(f, "json"),
            ImportFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Parse table content in the given format.
pub fn parse_table(content: &str, format: ImportFormat, delimiter: u8) -> Result<RawTable> {
    let table = match format {
        ImportFormat::Csv => csv::parse(content, delimiter)?,
        ImportFormat::Tsv => csv::parse(content, b'\t')?,
        ImportFormat::Json => records::parse_json(content)?,
        ImportFormat::Yaml => records::parse_yaml(content)?,
    };

    Ok(table.without_blank_rows())
}

/// Read and parse a table file. `format` overrides extension detection.
pub fn load_table(path: &Path, format: Option<ImportFormat>, delimiter: u8) -> Result<RawTable> {
    let format = match format {
        Some(format) => format,
        None => ImportFormat::from_path(path)?,
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read measurement table from {}", path.display()))?;

    let table = parse_table(&content, format, delimiter)
        .with_context(|| format!("Failed to parse {} as {}", path.display(), format))?;

    tracing::info!(
        path = %path.display(),
        %format,
        rows = table.len(),
        columns = table.headers.len(),
        "table imported"
    );

    Ok(table)
}

/// Sample rows shipped in the import template
const TEMPLATE_ROWS: [[&str; 5]; 2] = [
    ["Ø10 H7", "10.0", "-0.015", "0.0", "9.988"],
    ["Longueur A", "100.0", "-0.2", "0.2", "100.12"],
];

/// The blank import template: canonical headers plus two sample rows.
pub fn template_table() -> RawTable {
    let mut table = RawTable::new(
        Column::REQUIRED
            .iter()
            .map(|c| c.header().to_string())
            .collect(),
    );
    for row in TEMPLATE_ROWS {
        table.push_row(row.iter().map(|s| s.to_string()).collect());
    }
    table
}

/// The import template as CSV text.
pub fn template_csv(delimiter: u8) -> Result<String> {
    csv::write(&template_table(), delimiter)
}
