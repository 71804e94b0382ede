//! Markdown rendering from a tera template.
//!
//! The embedded template can be replaced by a `report.md` file in the
//! project's templates directory.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;

use super::{Renderer, Report, ReportFormat, ReportMetadata, TABLE_HEADERS};

const REPORT_MD: &str = include_str!("../../templates/report/report.md");
const TEMPLATE_NAME: &str = "report.md";

pub struct MarkdownRenderer {
    template_override: Option<PathBuf>,
}

impl MarkdownRenderer {
    /// Use `dir/report.md` when it exists, the embedded template otherwise.
    pub fn new(templates_dir: Option<&Path>) -> Self {
        let template_override = templates_dir
            .map(|dir| dir.join(TEMPLATE_NAME))
            .filter(|path| path.exists());
        Self { template_override }
    }

    fn tera(&self) -> Result<Tera> {
        let source = match &self.template_override {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using report template override");
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read template {}", path.display()))?
            }
            None => REPORT_MD.to_string(),
        };

        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, &source)
            .context("Failed to parse report template")?;
        tera.register_filter("md_cell", md_cell_filter);
        Ok(tera)
    }
}

impl Renderer for MarkdownRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }

    fn render(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let metadata = report.metadata;
        let config = report.config;

        let mut context = tera::Context::new();
        context.insert("title", &config.title);
        context.insert("company", &config.company);
        context.insert("date", &report.date());
        context.insert("operator", ReportMetadata::display(&metadata.operator));
        context.insert("part_reference", ReportMetadata::display(&metadata.part_reference));
        context.insert("order_reference", ReportMetadata::display(&metadata.order_reference));
        context.insert(
            "drawing",
            ReportMetadata::display(
                metadata
                    .drawing
                    .as_ref()
                    .map(|d| d.file_name.as_str())
                    .unwrap_or_default(),
            ),
        );
        context.insert("comment", ReportMetadata::display(&metadata.comment));
        context.insert("headers", &TABLE_HEADERS);
        context.insert("rows", &report.rows());
        context.insert("summary", &report.summary_line());
        context.insert("policy", &report.evaluation.summary.policy.to_string());
        let warnings: Vec<String> = report
            .evaluation
            .warnings
            .iter()
            .map(|w| w.to_string())
            .collect();
        context.insert("warnings", &warnings);

        let rendered = self
            .tera()?
            .render(TEMPLATE_NAME, &context)
            .context("Failed to render markdown report")?;
        Ok(rendered.into_bytes())
    }
}

/// Make a value safe inside a table cell.
fn md_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn md_cell_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    match value.as_str() {
        Some(s) => Ok(tera::Value::String(md_cell(s))),
        None => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::evaluate::{evaluate, EvaluateOptions};
    use crate::report::fixtures;
    use crate::table::RawTable;
    use tempfile::TempDir;

    fn render_with(renderer: &MarkdownRenderer, evaluation: &crate::evaluate::Evaluation) -> String {
        let metadata = fixtures::metadata();
        let config = ReportConfig::default();
        let report = Report::new(&metadata, evaluation, &config);
        String::from_utf8(renderer.render(&report).unwrap()).unwrap()
    }

    #[test]
    fn test_embedded_template() {
        let markdown = render_with(&MarkdownRenderer::new(None), &fixtures::evaluation());

        assert!(markdown.starts_with("# Dimensional Inspection Report\n"));
        assert!(markdown.contains("- **Date:** 2025-03-14 09:26"));
        assert!(markdown.contains("- **Order reference:** —"));
        assert!(markdown.contains(
            "| Characteristic | Nominal | Tolerance- | Tolerance+ | Measured | Lower bound | Upper bound | Conforms |"
        ));
        assert!(markdown.contains(
            "| Ø10 H7 | 10.0 | -0.015 | 0.0 | 9.988 | 9.985 | 10.0 | Conforming |"
        ));
        assert!(markdown.contains("**Result: 2/4 conforming • 1 non-conforming (1 undetermined)**"));
        assert!(!markdown.contains("## Warnings"));
    }

    #[test]
    fn test_warnings_section() {
        let mut table = RawTable::new(
            ["Characteristic", "Nominal", "Tolerance-", "Tolerance+", "Measured"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        table.push_row(
            ["A | B", "10", "-0.1", "0.1", "n/a"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let evaluation = evaluate(&table, &EvaluateOptions::default()).unwrap();
        let markdown = render_with(&MarkdownRenderer::new(None), &evaluation);

        assert!(markdown.contains("| A \\| B |"));
        assert!(markdown.contains("## Warnings"));
        assert!(markdown.contains("n/a"));
    }

    #[test]
    fn test_template_override() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("report.md"),
            "{{ title }} by {{ operator }}: {% for row in rows %}{{ row.verdict_short }} {% endfor %}",
        )
        .unwrap();

        let markdown = render_with(&MarkdownRenderer::new(Some(tmp.path())), &fixtures::evaluation());
        assert_eq!(
            markdown,
            "Dimensional Inspection Report by J. Martin: OK OK NOK N/A "
        );
    }

    #[test]
    fn test_missing_override_uses_embedded() {
        let tmp = TempDir::new().unwrap();
        let renderer = MarkdownRenderer::new(Some(tmp.path()));
        assert!(renderer.template_override.is_none());
    }

    #[test]
    fn test_md_cell() {
        assert_eq!(md_cell("a|b\nc"), "a\\|b c");
    }
}
