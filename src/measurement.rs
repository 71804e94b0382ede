//! Measurement rows and numeric coercion.
//!
//! A [`MeasurementRow`] is one inspected characteristic: its label, the nominal
//! dimension, the allowed deviations and the observed value. Every numeric field
//! is an `Option<f64>` where `None` means the source cell could not be read as a
//! finite number.

use serde::{Deserialize, Serialize};

/// One inspected characteristic as entered or imported.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementRow {
    /// Characteristic label, not required to be unique
    pub name: String,
    /// Target dimension
    pub nominal: Option<f64>,
    /// Lower deviation, conventionally <= 0
    pub tolerance_minus: Option<f64>,
    /// Upper deviation, conventionally >= 0
    pub tolerance_plus: Option<f64>,
    /// Observed value
    pub measured: Option<f64>,
}

impl MeasurementRow {
    /// Build a fully numeric row.
    pub fn new(
        name: impl Into<String>,
        nominal: f64,
        tolerance_minus: f64,
        tolerance_plus: f64,
        measured: f64,
    ) -> Self {
        Self {
            name: name.into(),
            nominal: finite(nominal),
            tolerance_minus: finite(tolerance_minus),
            tolerance_plus: finite(tolerance_plus),
            measured: finite(measured),
        }
    }

    /// Build a row from a single symmetric tolerance `t`, giving `-t` / `+t`.
    pub fn symmetric(name: impl Into<String>, nominal: f64, tolerance: f64, measured: f64) -> Self {
        let (minus, plus) = split_symmetric(finite(tolerance));
        Self {
            name: name.into(),
            nominal: finite(nominal),
            tolerance_minus: minus,
            tolerance_plus: plus,
            measured: finite(measured),
        }
    }

    /// `nominal + tolerance_minus`, if both are defined.
    pub fn lower_bound(&self) -> Option<f64> {
        Some(self.nominal? + self.tolerance_minus?)
    }

    /// `nominal + tolerance_plus`, if both are defined.
    pub fn upper_bound(&self) -> Option<f64> {
        Some(self.nominal? + self.tolerance_plus?)
    }

    /// Closed-interval conformity, `None` when any operand is undefined.
    pub fn conforms(&self) -> Option<bool> {
        let lower = self.lower_bound()?;
        let upper = self.upper_bound()?;
        let measured = self.measured?;
        Some(within_bounds(measured, lower, upper))
    }
}

/// Closed interval: `lower <= value <= upper`, both bounds included.
pub fn within_bounds(value: f64, lower: f64, upper: f64) -> bool {
    lower <= value && value <= upper
}

/// Derive `(-t, +t)` from a symmetric tolerance.
pub fn split_symmetric(tolerance: Option<f64>) -> (Option<f64>, Option<f64>) {
    (tolerance.map(|t| -t), tolerance)
}

/// Coerce a text cell to a finite number.
///
/// Surrounding whitespace is ignored and a lone decimal comma (`"9,988"`) is
/// accepted. Empty cells, text, `NaN` and infinities all yield `None`.
pub fn coerce_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = trimmed.parse::<f64>().ok().or_else(|| {
        if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
            trimmed.replace(',', ".").parse::<f64>().ok()
        } else {
            None
        }
    })?;

    finite(parsed)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Render a number for reports: rounded to `decimals`, trailing zeros removed.
///
/// Undefined values render as an empty string.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let mut text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.push('0');
        }
    }
    match text.as_str() {
        "-0.0" => "0.0".to_string(),
        "-0" => "0".to_string(),
        _ => text,
    }
}
