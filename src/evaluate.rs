//! Conformity evaluation.
//!
//! [`evaluate`] turns a [`RawTable`] into an [`Evaluation`]: one
//! [`EvaluatedRow`] per input row with its derived bounds and verdict, the
//! aggregate [`Summary`], and the non-fatal [`RowWarning`]s collected along the
//! way. Rows are independent; a bad cell only affects its own row.
//!
//! The only fatal condition is a [`SchemaError`]: a required column is absent
//! from the whole table, which is checked before any row is read.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::measurement::{coerce_number, split_symmetric, within_bounds, MeasurementRow};
use crate::table::{Column, ColumnMap, RawTable};

pub use crate::table::SchemaError;

/// Per-row outcome of the conformity check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Measured value inside the closed tolerance interval
    Conforming,
    /// Measured value outside the interval
    NonConforming,
    /// At least one operand could not be read
    Undetermined,
}

impl Verdict {
    fn from_conformity(conforms: Option<bool>) -> Self {
        match conforms {
            Some(true) => Verdict::Conforming,
            Some(false) => Verdict::NonConforming,
            None => Verdict::Undetermined,
        }
    }

    /// Short label used in narrow table cells
    pub fn short_label(&self) -> &'static str {
        match self {
            Verdict::Conforming => "OK",
            Verdict::NonConforming => "NOK",
            Verdict::Undetermined => "N/A",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Conforming => write!(f, "Conforming"),
            Verdict::NonConforming => write!(f, "Non-conforming"),
            Verdict::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// How undetermined rows enter the aggregate counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedPolicy {
    /// Count neither passing nor failing; `total = passing + failing + undetermined`
    #[default]
    Exclude,
    /// Count as failing; `failing = total - passing`
    Fail,
}

impl fmt::Display for UndefinedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedPolicy::Exclude => write!(f, "exclude"),
            UndefinedPolicy::Fail => write!(f, "fail"),
        }
    }
}

/// A non-fatal problem with one row. `row` is 1-based over data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowWarning {
    /// A numeric cell could not be coerced; the field is undefined
    Unparseable {
        row: usize,
        column: Column,
        value: String,
    },
    /// Lower bound above upper bound; no measurement can conform
    InvertedBounds { row: usize, lower: f64, upper: f64 },
}

impl RowWarning {
    pub fn row(&self) -> usize {
        match self {
            RowWarning::Unparseable { row, .. } | RowWarning::InvertedBounds { row, .. } => *row,
        }
    }
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarning::Unparseable { row, column, value } if value.trim().is_empty() => {
                write!(f, "row {}: '{}' is empty", row, column)
            }
            RowWarning::Unparseable { row, column, value } => {
                write!(f, "row {}: '{}' value {:?} is not a number", row, column, value)
            }
            RowWarning::InvertedBounds { row, lower, upper } => write!(
                f,
                "row {}: lower bound {} is above upper bound {}",
                row, lower, upper
            ),
        }
    }
}

/// An input row plus its derived fields.
///
/// Derived values are computed once at construction and only readable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedRow {
    #[serde(flatten)]
    row: MeasurementRow,
    lower_bound: Option<f64>,
    upper_bound: Option<f64>,
    verdict: Verdict,
}

impl EvaluatedRow {
    pub fn new(row: MeasurementRow) -> Self {
        Self {
            lower_bound: row.lower_bound(),
            upper_bound: row.upper_bound(),
            verdict: Verdict::from_conformity(row.conforms()),
            row,
        }
    }

    pub fn input(&self) -> &MeasurementRow {
        &self.row
    }

    pub fn name(&self) -> &str {
        &self.row.name
    }

    pub fn lower_bound(&self) -> Option<f64> {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> Option<f64> {
        self.upper_bound
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// `Some(bool)` for determined rows, `None` otherwise
    pub fn conforms(&self) -> Option<bool> {
        match self.verdict {
            Verdict::Conforming => Some(true),
            Verdict::NonConforming => Some(false),
            Verdict::Undetermined => None,
        }
    }
}

/// Aggregate counts over an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passing: usize,
    pub failing: usize,
    /// Rows whose verdict is undetermined, whatever the policy
    pub undetermined: usize,
    pub policy: UndefinedPolicy,
}

impl Summary {
    pub fn from_rows(rows: &[EvaluatedRow], policy: UndefinedPolicy) -> Self {
        let mut summary = Self {
            total: rows.len(),
            policy,
            ..Self::default()
        };

        for row in rows {
            match row.verdict() {
                Verdict::Conforming => summary.passing += 1,
                Verdict::NonConforming => summary.failing += 1,
                Verdict::Undetermined => {
                    summary.undetermined += 1;
                    if policy == UndefinedPolicy::Fail {
                        summary.failing += 1;
                    }
                }
            }
        }

        summary
    }

    /// True when every row conforms (and there is at least one row)
    pub fn all_conforming(&self) -> bool {
        self.total > 0 && self.passing == self.total
    }
}

/// Result of evaluating a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub rows: Vec<EvaluatedRow>,
    pub summary: Summary,
    pub warnings: Vec<RowWarning>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Options for [`evaluate`]
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    pub policy: UndefinedPolicy,
    /// Extra header spellings per column
    pub aliases: HashMap<Column, Vec<String>>,
}

/// Evaluate an imported table.
///
/// Fails only when a required column is missing from the header. Unreadable
/// cells are recorded as [`RowWarning::Unparseable`] and make that row's
/// verdict [`Verdict::Undetermined`].
pub fn evaluate(table: &RawTable, options: &EvaluateOptions) -> Result<Evaluation, SchemaError> {
    // No data rows, possibly no headers either (`[]` in JSON or YAML)
    if table.is_empty() {
        return Ok(evaluate_rows(&[], options.policy));
    }

    let columns = ColumnMap::resolve(&table.headers, &options.aliases)?;
    let mut warnings = Vec::new();

    let rows: Vec<MeasurementRow> = (0..table.len())
        .map(|index| read_row(table, &columns, index, &mut warnings))
        .collect();

    tracing::debug!(
        rows = rows.len(),
        unparseable = warnings.len(),
        "table rows coerced"
    );

    let mut evaluation = evaluate_rows(&rows, options.policy);
    warnings.append(&mut evaluation.warnings);
    warnings.sort_by_key(RowWarning::row);
    evaluation.warnings = warnings;

    Ok(evaluation)
}

/// Evaluate rows that are already typed.
pub fn evaluate_rows(rows: &[MeasurementRow], policy: UndefinedPolicy) -> Evaluation {
    let mut warnings = Vec::new();

    let evaluated: Vec<EvaluatedRow> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let evaluated = EvaluatedRow::new(row.clone());
            if let (Some(lower), Some(upper)) = (evaluated.lower_bound(), evaluated.upper_bound()) {
                if lower > upper {
                    warnings.push(RowWarning::InvertedBounds {
                        row: index + 1,
                        lower,
                        upper,
                    });
                }
            }
            evaluated
        })
        .collect();

    let summary = Summary::from_rows(&evaluated, policy);
    tracing::debug!(
        total = summary.total,
        passing = summary.passing,
        failing = summary.failing,
        undetermined = summary.undetermined,
        "conformity evaluated"
    );

    Evaluation {
        rows: evaluated,
        summary,
        warnings,
    }
}

fn read_row(
    table: &RawTable,
    columns: &ColumnMap,
    index: usize,
    warnings: &mut Vec<RowWarning>,
) -> MeasurementRow {
    let mut read = |column: Column| -> Option<f64> {
        let position = columns.index(column)?;
        let cell = table.cell(index, position);
        let value = coerce_number(cell);
        if value.is_none() {
            warnings.push(RowWarning::Unparseable {
                row: index + 1,
                column,
                value: cell.to_string(),
            });
        }
        value
    };

    let nominal = read(Column::Nominal);
    let measured = read(Column::Measured);

    let symmetric = if columns.uses_symmetric(Column::ToleranceMinus)
        || columns.uses_symmetric(Column::TolerancePlus)
    {
        split_symmetric(read(Column::Tolerance))
    } else {
        (None, None)
    };

    let tolerance_minus = if columns.uses_symmetric(Column::ToleranceMinus) {
        symmetric.0
    } else {
        read(Column::ToleranceMinus)
    };
    let tolerance_plus = if columns.uses_symmetric(Column::TolerancePlus) {
        symmetric.1
    } else {
        read(Column::TolerancePlus)
    };

    let name = columns
        .index(Column::Characteristic)
        .map(|position| table.cell(index, position).trim().to_string())
        .unwrap_or_default();

    MeasurementRow {
        name,
        nominal,
        tolerance_minus,
        tolerance_plus,
        measured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{parse_table, ImportFormat};

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(headers.iter().map(|s| s.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|s| s.to_string()).collect());
        }
        table
    }

    const HEADERS: [&str; 5] = ["Characteristic", "Nominal", "Tolerance-", "Tolerance+", "Measured"];

    #[test]
    fn test_reference_rows() {
        let input = table(
            &HEADERS,
            &[
                &["Ø10 H7", "10.0", "-0.015", "0.0", "9.988"],
                &["Longueur A", "100.0", "-0.2", "0.2", "100.12"],
                &["Ø10 H7 bis", "10.0", "-0.015", "0.0", "10.002"],
            ],
        );
        let result = evaluate(&input, &EvaluateOptions::default()).unwrap();

        let first = &result.rows[0];
        assert!((first.lower_bound().unwrap() - 9.985).abs() < 1e-12);
        assert_eq!(first.upper_bound(), Some(10.0));
        assert_eq!(first.verdict(), Verdict::Conforming);

        let second = &result.rows[1];
        assert!((second.lower_bound().unwrap() - 99.8).abs() < 1e-12);
        assert!((second.upper_bound().unwrap() - 100.2).abs() < 1e-12);
        assert_eq!(second.conforms(), Some(true));

        assert_eq!(result.rows[2].verdict(), Verdict::NonConforming);
        assert_eq!(result.summary.total, 3);
        assert_eq!(result.summary.passing, 2);
        assert_eq!(result.summary.failing, 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let result = evaluate(&table(&HEADERS, &[]), &EvaluateOptions::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(
            (result.summary.total, result.summary.passing, result.summary.failing),
            (0, 0, 0)
        );
        assert!(!result.summary.all_conforming());
    }

    #[test]
    fn test_empty_record_array_has_no_headers() {
        for (content, format) in [("[]", ImportFormat::Json), ("[]\n", ImportFormat::Yaml)] {
            let input = parse_table(content, format, b',').unwrap();
            assert!(input.headers.is_empty());

            let result = evaluate(&input, &EvaluateOptions::default()).unwrap();
            assert!(result.is_empty());
            assert_eq!(
                (result.summary.total, result.summary.passing, result.summary.failing),
                (0, 0, 0)
            );
        }
    }

    #[test]
    fn test_missing_measured_column_is_schema_error() {
        let input = table(
            &["Characteristic", "Nominal", "Tolerance-", "Tolerance+"],
            &[&["a", "1", "-0.1", "0.1"]],
        );
        let err = evaluate(&input, &EvaluateOptions::default()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumns { ref missing } if missing == &vec![Column::Measured]));
    }

    #[test]
    fn test_unparseable_measured_is_undetermined() {
        let input = table(
            &HEADERS,
            &[
                &["a", "10", "-0.1", "0.1", "10.05"],
                &["b", "10", "-0.1", "0.1", "n/a"],
                &["c", "10", "-0.1", "0.1", ""],
            ],
        );
        let result = evaluate(&input, &EvaluateOptions::default()).unwrap();

        assert_eq!(result.rows[1].verdict(), Verdict::Undetermined);
        assert_eq!(result.rows[1].conforms(), None);
        assert!(result.rows[1].lower_bound().is_some());
        assert_eq!(result.rows[2].verdict(), Verdict::Undetermined);

        assert_eq!(result.summary.total, 3);
        assert_eq!(result.summary.passing, 1);
        assert_eq!(result.summary.failing, 0);
        assert_eq!(result.summary.undetermined, 2);

        assert_eq!(result.warnings.len(), 2);
        assert_eq!(
            result.warnings[0],
            RowWarning::Unparseable {
                row: 2,
                column: Column::Measured,
                value: "n/a".to_string()
            }
        );
    }

    #[test]
    fn test_fail_policy_counts_undetermined_as_failing() {
        let input = table(
            &HEADERS,
            &[&["a", "10", "-0.1", "0.1", "10"], &["b", "x", "-0.1", "0.1", "10"]],
        );
        let options = EvaluateOptions {
            policy: UndefinedPolicy::Fail,
            ..Default::default()
        };
        let result = evaluate(&input, &options).unwrap();

        assert_eq!(result.rows[1].verdict(), Verdict::Undetermined);
        assert_eq!(result.summary.passing, 1);
        assert_eq!(result.summary.failing, 1);
        assert_eq!(result.summary.failing, result.summary.total - result.summary.passing);
    }

    #[test]
    fn test_symmetric_tolerance_column() {
        let input = table(
            &["Characteristic", "Nominal", "Tolerance", "Measured"],
            &[&["len", "50", "0.05", "50.05"], &["len", "50", "0.05", "49.9"]],
        );
        let result = evaluate(&input, &EvaluateOptions::default()).unwrap();

        let row = result.rows[0].input();
        assert_eq!(row.tolerance_minus, Some(-0.05));
        assert_eq!(row.tolerance_plus, Some(0.05));
        assert_eq!(result.rows[0].verdict(), Verdict::Conforming);
        assert_eq!(result.rows[1].verdict(), Verdict::NonConforming);
    }

    #[test]
    fn test_explicit_tolerance_beats_symmetric() {
        let input = table(
            &["Characteristic", "Nominal", "Tolerance", "Tolerance-", "Tolerance+", "Measured"],
            &[&["a", "10", "1", "-0.1", "0.2", "10.15"]],
        );
        let result = evaluate(&input, &EvaluateOptions::default()).unwrap();
        let row = result.rows[0].input();
        assert_eq!(row.tolerance_minus, Some(-0.1));
        assert_eq!(row.tolerance_plus, Some(0.2));
    }

    #[test]
    fn test_unparseable_symmetric_tolerance_warns_once() {
        let input = table(
            &["Characteristic", "Nominal", "Tolerance", "Measured"],
            &[&["a", "10", "?", "10"]],
        );
        let result = evaluate(&input, &EvaluateOptions::default()).unwrap();
        assert_eq!(result.rows[0].verdict(), Verdict::Undetermined);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_inverted_bounds_warning() {
        let rows = vec![MeasurementRow::new("odd", 10.0, 0.2, -0.2, 10.0)];
        let result = evaluate_rows(&rows, UndefinedPolicy::Exclude);
        assert_eq!(result.rows[0].verdict(), Verdict::NonConforming);
        assert!(matches!(
            result.warnings[0],
            RowWarning::InvertedBounds { row: 1, .. }
        ));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let input = table(
            &HEADERS,
            &[&["a", "10", "-0.1", "0.1", "10.1"], &["b", "10", "-0.1", "0.1", "bad"]],
        );
        let first = evaluate(&input, &EvaluateOptions::default()).unwrap();
        let second = evaluate(&input, &EvaluateOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_rows_are_undetermined() {
        let input = table(&HEADERS, &[&["a", "10", "-0.1"]]);
        let result = evaluate(&input, &EvaluateOptions::default()).unwrap();
        assert_eq!(result.rows[0].verdict(), Verdict::Undetermined);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::Conforming.to_string(), "Conforming");
        assert_eq!(Verdict::NonConforming.short_label(), "NOK");
        assert_eq!(Verdict::Undetermined.short_label(), "N/A");
    }
}
