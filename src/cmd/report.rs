//! `dimcheck report`: evaluate a table and write the inspection report.

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use std::path::{Path, PathBuf};

use dimcheck::config::Config;
use dimcheck::drawing::Drawing;
use dimcheck::evaluate::Evaluation;
use dimcheck::formatters::format_summary;
use dimcheck::report::{parse_formats, write_reports, Report, ReportFormat, ReportMetadata};
use dimcheck::ui;

/// Arguments of `dimcheck report`
#[derive(Debug, Default)]
pub struct ReportArgs {
    pub file: PathBuf,
    pub input_format: Option<String>,
    /// Comma-separated list; `report.formats` from config when absent
    pub formats: Option<String>,
    pub operator: Option<String>,
    pub part_reference: Option<String>,
    pub order_reference: Option<String>,
    pub comment: Option<String>,
    pub drawing: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

pub fn cmd_report(args: ReportArgs) -> Result<()> {
    let config = Config::load()?;
    let evaluation = super::load_and_evaluate(&args.file, args.input_format.as_deref(), &config)?;

    let templates = super::templates_dir();
    let written = generate(&args, &config, &evaluation, templates.as_deref())?;

    let Some(written) = written else {
        println!("{} Nothing to export: the table has no rows.", "ℹ".cyan());
        return Ok(());
    };

    if !ui::is_quiet() {
        println!("{}", format_summary(&evaluation.summary));
    }
    if written.is_empty() {
        println!("{}", ui::colors::secondary("No report files written (format: none)."));
    }
    for path in &written {
        println!("{} Wrote {}", "✓".green(), path.display());
    }

    Ok(())
}

/// Render the requested formats. `None` when there is nothing to export.
pub fn generate(
    args: &ReportArgs,
    config: &Config,
    evaluation: &Evaluation,
    templates_dir: Option<&Path>,
) -> Result<Option<Vec<PathBuf>>> {
    if evaluation.is_empty() {
        return Ok(None);
    }

    let formats: Vec<ReportFormat> = match &args.formats {
        Some(list) => parse_formats(list)?,
        None => config.report.formats.clone(),
    };

    let drawing = args.drawing.as_deref().map(Drawing::load).transpose()?;

    let metadata = ReportMetadata {
        operator: args.operator.clone().unwrap_or_default(),
        part_reference: args.part_reference.clone().unwrap_or_default(),
        order_reference: args.order_reference.clone().unwrap_or_default(),
        comment: args.comment.clone().unwrap_or_default(),
        drawing,
        generated_at: Local::now(),
    };

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir());

    let report = Report::new(&metadata, evaluation, &config.report);
    let written = write_reports(&report, &formats, &output_dir, templates_dir)?;
    Ok(Some(written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimcheck::evaluate::{evaluate_rows, UndefinedPolicy};
    use dimcheck::measurement::MeasurementRow;
    use std::fs;
    use tempfile::TempDir;

    fn evaluation() -> Evaluation {
        evaluate_rows(
            &[MeasurementRow::new("Ø10 H7", 10.0, -0.015, 0.0, 9.988)],
            UndefinedPolicy::Exclude,
        )
    }

    #[test]
    fn test_generate_writes_each_format() {
        let tmp = TempDir::new().unwrap();
        let args = ReportArgs {
            formats: Some("markdown,csv,json".to_string()),
            operator: Some("J. Martin".to_string()),
            output_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let written = generate(&args, &Config::default(), &evaluation(), None)
            .unwrap()
            .unwrap();
        assert_eq!(written.len(), 3);

        let markdown = written
            .iter()
            .find(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
            .unwrap();
        let name = markdown.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("PV_controle_"));
        assert!(fs::read_to_string(markdown).unwrap().contains("J. Martin"));
    }

    #[test]
    fn test_generate_uses_config_formats() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.report.formats = vec![ReportFormat::Json];
        config.report.file_prefix = "PV".to_string();
        let args = ReportArgs {
            output_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let written = generate(&args, &config, &evaluation(), None).unwrap().unwrap();
        assert_eq!(written.len(), 1);
        let name = written[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("PV_") && name.ends_with(".json"));
    }

    #[test]
    fn test_generate_nothing_to_export() {
        let tmp = TempDir::new().unwrap();
        let args = ReportArgs {
            formats: Some("json".to_string()),
            output_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        let empty = evaluate_rows(&[], UndefinedPolicy::Exclude);

        assert!(generate(&args, &Config::default(), &empty, None)
            .unwrap()
            .is_none());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_generate_none_format_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let args = ReportArgs {
            formats: Some("none".to_string()),
            output_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let written = generate(&args, &Config::default(), &evaluation(), None)
            .unwrap()
            .unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_generate_rejects_missing_drawing() {
        let tmp = TempDir::new().unwrap();
        let args = ReportArgs {
            formats: Some("json".to_string()),
            drawing: Some(tmp.path().join("missing.png")),
            output_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let err = generate(&args, &Config::default(), &evaluation(), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read drawing"));
    }
}
