//! Library-level workflow: import a table, evaluate it, write reports.

mod support;

use chrono::{Local, TimeZone};
use dimcheck::config::{Config, ReportConfig};
use dimcheck::drawing::Drawing;
use dimcheck::evaluate::{evaluate, evaluate_rows, UndefinedPolicy, Verdict};
use dimcheck::import::{load_table, parse_table, ImportFormat};
use dimcheck::measurement::MeasurementRow;
use dimcheck::report::{write_reports, Report, ReportFormat, ReportMetadata};
use std::fs;
use std::io::Cursor;
use support::harness::{TestHarness, SAMPLE_CSV};

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([40, 40, 160]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

#[test]
fn test_bounds_are_inclusive() {
    let evaluation = evaluate_rows(
        &[
            MeasurementRow::new("at lower", 10.0, -0.1, 0.1, 9.9),
            MeasurementRow::new("at upper", 10.0, -0.1, 0.1, 10.1),
            MeasurementRow::new("just over", 10.0, -0.1, 0.1, 10.1001),
        ],
        UndefinedPolicy::Exclude,
    );

    let verdicts: Vec<Verdict> = evaluation.rows.iter().map(|r| r.verdict()).collect();
    assert_eq!(
        verdicts,
        vec![Verdict::Conforming, Verdict::Conforming, Verdict::NonConforming]
    );
    assert_eq!(evaluation.summary.passing, 2);
    assert_eq!(evaluation.summary.failing, 1);
}

#[test]
fn test_symmetric_tolerance_column() {
    let table = parse_table(
        "Feature,Nominal,Tol,Actual\nLength,50,0.2,50.15\nWidth,20,0.1,20.2\n",
        ImportFormat::Csv,
        b',',
    )
    .unwrap();
    let evaluation = evaluate(&table, &Config::default().evaluate_options()).unwrap();

    let lower = evaluation.rows[0].lower_bound().unwrap();
    assert!((lower - 49.8).abs() < 1e-9);
    assert_eq!(evaluation.rows[0].verdict(), Verdict::Conforming);
    assert_eq!(evaluation.rows[1].verdict(), Verdict::NonConforming);
}

#[test]
fn test_yaml_records_with_unreadable_cell() {
    let table = parse_table(
        "- Characteristic: Bore\n  Nominal: 25\n  Tolerance-: -0.05\n  Tolerance+: 0.05\n  Measured: abc\n",
        ImportFormat::Yaml,
        b',',
    )
    .unwrap();

    let evaluation = evaluate(&table, &Config::default().evaluate_options()).unwrap();
    assert_eq!(evaluation.rows[0].verdict(), Verdict::Undetermined);
    assert_eq!(evaluation.summary.undetermined, 1);
    assert_eq!(evaluation.summary.failing, 0);
    assert!(!evaluation.warnings.is_empty());
}

#[test]
fn test_reports_with_drawing() {
    let harness = TestHarness::new();
    let path = harness.write("measures.csv", SAMPLE_CSV);
    let drawing_path = harness.write("plan.jpg", jpeg(400, 300));

    let table = load_table(&path, None, b',').unwrap();
    let evaluation = evaluate(&table, &Config::default().evaluate_options()).unwrap();

    let metadata = ReportMetadata {
        operator: "J. Martin".to_string(),
        part_reference: "PRT-0042".to_string(),
        drawing: Some(Drawing::load(&drawing_path).unwrap()),
        generated_at: Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 0).unwrap(),
        ..Default::default()
    };
    let config = ReportConfig::default();
    let report = Report::new(&metadata, &evaluation, &config);

    let out = harness.path().join("out");
    let written = write_reports(
        &report,
        &[ReportFormat::Docx, ReportFormat::Pdf, ReportFormat::Json],
        &out,
        None,
    )
    .unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "PV_controle_20250314_0926.docx",
            "PV_controle_20250314_0926.pdf",
            "PV_controle_20250314_0926.json",
        ]
    );

    let pdf = fs::read(&written[1]).unwrap();
    let pdf_text = String::from_utf8_lossy(&pdf);
    assert!(pdf_text.contains("/Filter /DCTDecode"));
    assert!(pdf_text.contains("/Width 400"));

    let json: serde_json::Value = serde_json::from_slice(&fs::read(&written[2]).unwrap()).unwrap();
    assert_eq!(json["operator"], "J. Martin");
    assert_eq!(json["summary"]["total"], 4);
    assert_eq!(json["rows"].as_array().unwrap().len(), 4);
}

#[test]
fn test_none_format_writes_nothing() {
    let harness = TestHarness::new();
    let evaluation = evaluate_rows(
        &[MeasurementRow::new("A", 1.0, -0.1, 0.1, 1.0)],
        UndefinedPolicy::Fail,
    );
    let metadata = ReportMetadata::default();
    let config = ReportConfig::default();
    let report = Report::new(&metadata, &evaluation, &config);

    let written = write_reports(&report, &[ReportFormat::None], harness.path(), None).unwrap();
    assert!(written.is_empty());
}
