//! JSON export of the evaluation with report metadata.

use anyhow::{Context, Result};
use serde_json::json;

use super::{Renderer, Report, ReportFormat};

/// Numbers are written at full precision; `null` marks undefined values.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn render(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let metadata = report.metadata;
        let value = json!({
            "title": report.config.title,
            "company": report.config.company,
            "generated_at": metadata.generated_at.to_rfc3339(),
            "operator": metadata.operator,
            "part_reference": metadata.part_reference,
            "order_reference": metadata.order_reference,
            "comment": metadata.comment,
            "drawing": metadata.drawing.as_ref().map(|d| d.file_name.as_str()),
            "summary": report.evaluation.summary,
            "rows": report.evaluation.rows,
            "warnings": report.evaluation.warnings,
        });

        let mut bytes = serde_json::to_vec_pretty(&value).context("Failed to serialize report")?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
