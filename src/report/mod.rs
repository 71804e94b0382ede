//! Inspection report rendering.
//!
//! A [`Report`] bundles an [`Evaluation`] with the operator-supplied
//! [`ReportMetadata`]. Each output format is a [`Renderer`] that turns a
//! report into bytes; [`ReportFormat::renderer`] is the registry. The set of
//! formats written is explicit configuration, never a runtime probe.
//!
//! ## Formats
//!
//! - [`docx`] - Word document (Office Open XML package)
//! - [`pdf`] - PDF 1.4, A4 portrait
//! - [`markdown`] - Markdown, from an overridable template
//! - [`csv`] / [`json`] - the evaluated table for other tools
//! - `none` - renders nothing

pub mod csv;
pub mod docx;
pub mod json;
pub mod markdown;
pub mod pdf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::ReportConfig;
use crate::drawing::Drawing;
use crate::evaluate::{EvaluatedRow, Evaluation, Verdict};
use crate::measurement::format_number;

/// Placeholder printed for empty metadata fields
pub const EMPTY_FIELD: &str = "—";

/// Column headings of the results table, in order
pub const TABLE_HEADERS: [&str; 8] = [
    "Characteristic",
    "Nominal",
    "Tolerance-",
    "Tolerance+",
    "Measured",
    "Lower bound",
    "Upper bound",
    "Conforms",
];

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[serde(alias = "word")]
    Docx,
    Pdf,
    #[serde(alias = "md")]
    Markdown,
    Csv,
    Json,
    #[serde(alias = "noop")]
    None,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 6] = [
        ReportFormat::Docx,
        ReportFormat::Pdf,
        ReportFormat::Markdown,
        ReportFormat::Csv,
        ReportFormat::Json,
        ReportFormat::None,
    ];

    /// File extension, `None` for formats that write no file
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ReportFormat::Docx => Some("docx"),
            ReportFormat::Pdf => Some("pdf"),
            ReportFormat::Markdown => Some("md"),
            ReportFormat::Csv => Some("csv"),
            ReportFormat::Json => Some("json"),
            ReportFormat::None => None,
        }
    }

    /// The renderer for this format, with embedded templates.
    pub fn renderer(&self) -> Box<dyn Renderer> {
        self.renderer_with_templates(None)
    }

    /// The renderer for this format; text templates may be overridden from `dir`.
    pub fn renderer_with_templates(&self, dir: Option<&Path>) -> Box<dyn Renderer> {
        match self {
            ReportFormat::Docx => Box::new(docx::DocxRenderer),
            ReportFormat::Pdf => Box::new(pdf::PdfRenderer),
            ReportFormat::Markdown => Box::new(markdown::MarkdownRenderer::new(dir)),
            ReportFormat::Csv => Box::new(csv::CsvRenderer),
            ReportFormat::Json => Box::new(json::JsonRenderer),
            ReportFormat::None => Box::new(NoopRenderer),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "docx" | "word" => Ok(ReportFormat::Docx),
            "pdf" => Ok(ReportFormat::Pdf),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            "none" | "noop" => Ok(ReportFormat::None),
            _ => anyhow::bail!(
                "Unknown report format: {}. Supported formats: docx, pdf, markdown, csv, json, none",
                s
            ),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Docx => write!(f, "docx"),
            ReportFormat::Pdf => write!(f, "pdf"),
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::None => write!(f, "none"),
        }
    }
}

/// Parse a comma-separated format list such as `docx,pdf`.
pub fn parse_formats(list: &str) -> Result<Vec<ReportFormat>> {
    let mut formats = Vec::new();
    for part in list.split(',').filter(|p| !p.trim().is_empty()) {
        let format: ReportFormat = part.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

/// Turns a report into document bytes
pub trait Renderer {
    fn format(&self) -> ReportFormat;

    fn render(&self, report: &Report<'_>) -> Result<Vec<u8>>;
}

/// Renders nothing; selected when no document output is wanted
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::None
    }

    fn render(&self, _report: &Report<'_>) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// Free-text header information, embedded verbatim
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub operator: String,
    pub part_reference: String,
    pub order_reference: String,
    pub comment: String,
    pub drawing: Option<Drawing>,
    pub generated_at: DateTime<Local>,
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self {
            operator: String::new(),
            part_reference: String::new(),
            order_reference: String::new(),
            comment: String::new(),
            drawing: None,
            generated_at: Local::now(),
        }
    }
}

impl ReportMetadata {
    /// Field value, or [`EMPTY_FIELD`] when blank
    pub fn display(value: &str) -> &str {
        if value.trim().is_empty() {
            EMPTY_FIELD
        } else {
            value
        }
    }

    /// Labelled header lines shared by all document formats
    pub fn header_lines(&self, date_format: &str) -> Vec<(&'static str, String)> {
        vec![
            ("Date", self.generated_at.format(date_format).to_string()),
            ("Operator", Self::display(&self.operator).to_string()),
            ("Part reference", Self::display(&self.part_reference).to_string()),
            ("Order reference", Self::display(&self.order_reference).to_string()),
        ]
    }
}

/// One results-table row with every cell formatted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub characteristic: String,
    pub nominal: String,
    pub tolerance_minus: String,
    pub tolerance_plus: String,
    pub measured: String,
    pub lower_bound: String,
    pub upper_bound: String,
    pub verdict: String,
    pub verdict_short: &'static str,
    /// `conforming`, `non_conforming` or `undetermined`, for styling
    pub status: &'static str,
}

impl ReportRow {
    pub fn from_evaluated(row: &EvaluatedRow, decimals: usize) -> Self {
        let input = row.input();
        Self {
            characteristic: input.name.clone(),
            nominal: format_number(input.nominal, decimals),
            tolerance_minus: format_number(input.tolerance_minus, decimals),
            tolerance_plus: format_number(input.tolerance_plus, decimals),
            measured: format_number(input.measured, decimals),
            lower_bound: format_number(row.lower_bound(), decimals),
            upper_bound: format_number(row.upper_bound(), decimals),
            verdict: row.verdict().to_string(),
            verdict_short: row.verdict().short_label(),
            status: match row.verdict() {
                Verdict::Conforming => "conforming",
                Verdict::NonConforming => "non_conforming",
                Verdict::Undetermined => "undetermined",
            },
        }
    }

    /// Cells in [`TABLE_HEADERS`] order
    pub fn cells(&self) -> [&str; 8] {
        [
            &self.characteristic,
            &self.nominal,
            &self.tolerance_minus,
            &self.tolerance_plus,
            &self.measured,
            &self.lower_bound,
            &self.upper_bound,
            &self.verdict,
        ]
    }
}

/// Everything a renderer needs
pub struct Report<'a> {
    pub metadata: &'a ReportMetadata,
    pub evaluation: &'a Evaluation,
    pub config: &'a ReportConfig,
}

impl<'a> Report<'a> {
    pub fn new(
        metadata: &'a ReportMetadata,
        evaluation: &'a Evaluation,
        config: &'a ReportConfig,
    ) -> Self {
        Self {
            metadata,
            evaluation,
            config,
        }
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.evaluation
            .rows
            .iter()
            .map(|row| ReportRow::from_evaluated(row, self.config.decimals))
            .collect()
    }

    pub fn date(&self) -> String {
        self.metadata
            .generated_at
            .format(&self.config.date_format)
            .to_string()
    }

    pub fn summary_line(&self) -> String {
        summary_line(&self.evaluation.summary)
    }
}

/// `Result: 2/3 conforming • 1 non-conforming`, plus undetermined rows if any
pub fn summary_line(summary: &crate::evaluate::Summary) -> String {
    let mut line = format!(
        "Result: {}/{} conforming • {} non-conforming",
        summary.passing, summary.total, summary.failing
    );
    if summary.undetermined > 0 {
        line.push_str(&format!(" ({} undetermined)", summary.undetermined));
    }
    line
}

/// `{prefix}_{YYYYmmdd_HHMM}.{ext}`
pub fn file_name(prefix: &str, format: ReportFormat, at: &DateTime<Local>) -> Option<String> {
    format
        .extension()
        .map(|ext| format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M"), ext))
}

/// Render each format and write it into `dir`. Returns the written paths.
///
/// Files are written through a temporary file in the same directory and
/// renamed into place, so a failed render never leaves a partial document.
pub fn write_reports(
    report: &Report<'_>,
    formats: &[ReportFormat],
    dir: &Path,
    templates_dir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for format in formats {
        let Some(name) = file_name(&report.config.file_prefix, *format, &report.metadata.generated_at)
        else {
            tracing::debug!(%format, "format writes no file");
            continue;
        };

        let renderer = format.renderer_with_templates(templates_dir);
        let bytes = renderer
            .render(report)
            .with_context(|| format!("Failed to render {} report", format))?;

        let path = dir.join(name);
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(&bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "report written");
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::evaluate::{evaluate_rows, UndefinedPolicy};
    use crate::measurement::MeasurementRow;
    use chrono::TimeZone;

    pub fn evaluation() -> Evaluation {
        let mut undetermined = MeasurementRow::new("Bore C", 25.0, -0.05, 0.05, 25.0);
        undetermined.measured = None;

        evaluate_rows(
            &[
                MeasurementRow::new("Ø10 H7", 10.0, -0.015, 0.0, 9.988),
                MeasurementRow::new("Longueur A", 100.0, -0.2, 0.2, 100.12),
                MeasurementRow::new("Ø10 H7 <bis> & co", 10.0, -0.015, 0.0, 10.002),
                undetermined,
            ],
            UndefinedPolicy::Exclude,
        )
    }

    pub fn metadata() -> ReportMetadata {
        ReportMetadata {
            operator: "J. Martin".to_string(),
            part_reference: "PRT-0042".to_string(),
            order_reference: String::new(),
            comment: "First article\nsecond line".to_string(),
            drawing: None,
            generated_at: Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 0).unwrap(),
        }
    }
}
