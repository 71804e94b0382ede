//! Default values and configuration structs with default implementations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::evaluate::UndefinedPolicy;
use crate::report::ReportFormat;
use crate::table::Column;

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub(crate) fn $name() -> $type {
            $value
        }
    };
}

// =========================================================================
// DEFAULT VALUE FUNCTIONS
// =========================================================================

default_fn!(default_delimiter, String, ",".to_string());
default_fn!(
    default_report_title,
    String,
    "Dimensional Inspection Report".to_string()
);
default_fn!(default_file_prefix, String, "PV_controle".to_string());
default_fn!(default_output_dir, String, ".".to_string());
default_fn!(default_decimals, usize, 6);
default_fn!(
    default_formats,
    Vec<ReportFormat>,
    vec![ReportFormat::Docx, ReportFormat::Pdf]
);
default_fn!(default_date_format, String, "%Y-%m-%d %H:%M".to_string());

// =========================================================================
// CONFIG STRUCTS WITH DEFAULTS
// =========================================================================

/// Project identification
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProjectConfig {
    /// Project name, shown in `dimcheck config`
    #[serde(default)]
    pub name: String,
}

/// Conformity evaluation settings
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default)]
pub struct EvaluationConfig {
    /// How rows with unreadable numbers enter the pass/fail counts
    #[serde(default)]
    pub undefined_policy: UndefinedPolicy,
}

/// Table import settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Field delimiter for CSV input (single character, default: ",")
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

impl ImportConfig {
    /// Delimiter as a byte; validation guarantees a single ASCII character.
    pub fn delimiter_byte(&self) -> u8 {
        match self.delimiter.as_str() {
            "\\t" | "tab" => b'\t',
            other => other.bytes().next().unwrap_or(b','),
        }
    }
}

/// Report generation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Document heading
    #[serde(default = "default_report_title")]
    pub title: String,
    /// Company or workshop name printed under the heading
    #[serde(default)]
    pub company: Option<String>,
    /// Formats written by `dimcheck report` when --format is omitted
    #[serde(default = "default_formats")]
    pub formats: Vec<ReportFormat>,
    /// File name prefix, followed by a timestamp
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Directory reports are written to (`~` is expanded)
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Maximum decimals printed for numbers (trailing zeros are trimmed)
    #[serde(default = "default_decimals")]
    pub decimals: usize,
    /// chrono format string for the report date
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_report_title(),
            company: None,
            formats: default_formats(),
            file_prefix: default_file_prefix(),
            output_dir: default_output_dir(),
            decimals: default_decimals(),
            date_format: default_date_format(),
        }
    }
}

/// Extra header spellings per column, e.g. `measured: [Relevé]`
pub type ColumnAliases = HashMap<Column, Vec<String>>;
