//! CSV export of the evaluated table.

use anyhow::{Context, Result};

use super::{Renderer, Report, ReportFormat, TABLE_HEADERS};

/// Writes one record per row with the derived bounds and a short verdict
/// (`OK`, `NOK`, `N/A`). Always comma-delimited.
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }

    fn render(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let mut writer = ::csv::Writer::from_writer(Vec::new());
        writer
            .write_record(TABLE_HEADERS)
            .context("Failed to write CSV header")?;

        for row in report.rows() {
            let mut cells = row.cells();
            cells[7] = row.verdict_short;
            writer
                .write_record(cells)
                .with_context(|| format!("Failed to write CSV row for {}", row.characteristic))?;
        }

        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))
    }
}
