//! Output formatters for evaluation results
//!
//! Turns an [`Evaluation`] into the aligned, colourised table and summary
//! printed by `dimcheck check`.

use colored::Colorize;

use crate::evaluate::{Evaluation, Summary};
use crate::report::{summary_line, ReportRow, TABLE_HEADERS};
use crate::ui::{self, format};

/// Longest characteristic label shown before truncation
const NAME_WIDTH: usize = 30;

/// Format the evaluated rows as an aligned table, one line per row.
pub fn format_evaluation_table(evaluation: &Evaluation, decimals: usize) -> String {
    let rows: Vec<ReportRow> = evaluation
        .rows
        .iter()
        .map(|row| ReportRow::from_evaluated(row, decimals))
        .collect();

    let names: Vec<String> = rows
        .iter()
        .map(|row| format::truncate(&row.characteristic, NAME_WIDTH))
        .collect();

    // Column widths from the plain text, before any colour codes are added
    let mut widths: Vec<usize> = TABLE_HEADERS.iter().map(|h| h.chars().count()).collect();
    for (row, name) in rows.iter().zip(&names) {
        let cells = row.cells();
        widths[0] = widths[0].max(name.chars().count());
        for (i, cell) in cells.iter().enumerate().skip(1) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let header: Vec<String> = TABLE_HEADERS
        .iter()
        .enumerate()
        .map(|(i, h)| format::pad(h, widths[i]))
        .collect();
    let total_width = widths.iter().sum::<usize>() + 2 * widths.len() + 2;

    let mut output = vec![
        format!("  {}", ui::colors::heading(&header.join("  "))),
        format!("  {}", format::separator(total_width)),
    ];

    for ((row, name), evaluated) in rows.iter().zip(&names).zip(&evaluation.rows) {
        let cells = row.cells();
        let mut line = vec![format::pad(name, widths[0])];
        for i in 1..7 {
            line.push(format::pad_left(cells[i], widths[i]));
        }
        let verdict = evaluated.verdict();
        line.push(
            ui::verdict_colored(&format::pad(cells[7], widths[7]), verdict).to_string(),
        );
        output.push(format!("{} {}", ui::verdict_icon(verdict), line.join("  ")));
    }

    output.join("\n")
}

/// Summary line coloured by outcome.
pub fn format_summary(summary: &Summary) -> String {
    let line = summary_line(summary);
    if summary.total == 0 {
        line.dimmed().to_string()
    } else if summary.all_conforming() {
        line.green().bold().to_string()
    } else if summary.failing > 0 {
        line.red().bold().to_string()
    } else {
        line.yellow().bold().to_string()
    }
}

/// One `Warning:` line per row warning.
pub fn format_warnings(evaluation: &Evaluation) -> Vec<String> {
    evaluation
        .warnings
        .iter()
        .map(|warning| format!("{} {}", "Warning:".yellow(), warning))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::{evaluate_rows, UndefinedPolicy};
    use crate::measurement::MeasurementRow;

    fn evaluation() -> Evaluation {
        let mut missing = MeasurementRow::new("Bore", 5.0, -0.1, 0.1, 5.0);
        missing.measured = None;
        evaluate_rows(
            &[
                MeasurementRow::new("Ø10 H7", 10.0, -0.015, 0.0, 9.988),
                MeasurementRow::new("Ø10 H7 bis", 10.0, -0.015, 0.0, 10.002),
                missing,
            ],
            UndefinedPolicy::Exclude,
        )
    }

    #[test]
    fn test_table_has_header_and_rows() {
        colored::control::set_override(false);
        let table = format_evaluation_table(&evaluation(), 6);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].trim_start().starts_with("Characteristic"));
        assert!(lines[2].starts_with("✔ Ø10 H7"));
        assert!(lines[2].contains("9.985"));
        assert!(lines[3].starts_with("✘ "));
        assert!(lines[3].contains("Non-conforming"));
        assert!(lines[4].starts_with("? Bore"));
    }

    #[test]
    fn test_columns_are_aligned() {
        colored::control::set_override(false);
        let table = format_evaluation_table(&evaluation(), 6);
        let widths: Vec<usize> = table.lines().skip(2).map(|l| l.chars().count()).collect();
        // Every cell is padded, so all rows have the same width
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_summary_and_warnings() {
        colored::control::set_override(false);
        let evaluation = evaluation();
        assert_eq!(
            format_summary(&evaluation.summary),
            "Result: 1/3 conforming • 1 non-conforming (1 undetermined)"
        );
        assert!(format_warnings(&evaluation).is_empty());
    }
}
