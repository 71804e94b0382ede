//! Raw measurement tables and column resolution.
//!
//! Importers produce a [`RawTable`] of text cells with whatever headers the
//! operator used. [`ColumnMap::resolve`] maps those headers onto the known
//! [`Column`]s, accepting English and French names plus configured aliases,
//! and reports every missing column at once as a [`SchemaError`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// A required column is absent from the table as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Table has no header row")]
    EmptyHeader,

    #[error(
        "Missing column(s): {}. Expected {} (a single symmetric 'Tolerance' column may replace the two tolerance columns)",
        quoted_headers(.missing),
        expected_columns()
    )]
    MissingColumns { missing: Vec<Column> },
}

fn quoted_headers(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c.header()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn expected_columns() -> String {
    Column::REQUIRED
        .iter()
        .map(|c| c.header())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Columns the evaluator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Characteristic,
    Nominal,
    ToleranceMinus,
    TolerancePlus,
    /// Single symmetric tolerance, split into `-t` / `+t`
    Tolerance,
    Measured,
}

impl Column {
    /// Columns in canonical table order (symmetric tolerance excluded).
    pub const REQUIRED: [Column; 5] = [
        Column::Characteristic,
        Column::Nominal,
        Column::ToleranceMinus,
        Column::TolerancePlus,
        Column::Measured,
    ];

    pub const ALL: [Column; 6] = [
        Column::Characteristic,
        Column::Nominal,
        Column::ToleranceMinus,
        Column::TolerancePlus,
        Column::Tolerance,
        Column::Measured,
    ];

    /// Canonical header text.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Characteristic => "Characteristic",
            Column::Nominal => "Nominal",
            Column::ToleranceMinus => "Tolerance-",
            Column::TolerancePlus => "Tolerance+",
            Column::Tolerance => "Tolerance",
            Column::Measured => "Measured",
        }
    }

    /// Built-in header spellings, compared after [`normalize_header`].
    fn builtin_aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Characteristic => &[
                "characteristic",
                "caracteristique",
                "feature",
                "name",
                "designation",
            ],
            Column::Nominal => &["nominal", "nominal value", "cote nominale"],
            Column::ToleranceMinus => &[
                "tolerance-",
                "tolerance -",
                "tol-",
                "tol -",
                "lower tolerance",
                "tolerance minus",
            ],
            Column::TolerancePlus => &[
                "tolerance+",
                "tolerance +",
                "tol+",
                "tol +",
                "upper tolerance",
                "tolerance plus",
            ],
            Column::Tolerance => &["tolerance", "tol", "tolerance +/-", "tol +/-", "±"],
            Column::Measured => &["measured", "mesure", "measure", "actual", "valeur mesuree"],
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_]+").expect("static regex"))
}

/// Fold a header for comparison: lowercase, strip Latin accents, collapse
/// whitespace and underscores to one space, and drop spaces before `-`/`+`.
pub fn normalize_header(header: &str) -> String {
    let folded: String = header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(strip_accent)
        .collect();

    let collapsed = separator_regex().replace_all(folded.trim(), " ");
    collapsed.replace(" -", "-").replace(" +", "+")
}

fn strip_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' | 'í' => 'i',
        'ô' | 'ö' | 'ó' => 'o',
        'ù' | 'û' | 'ü' | 'ú' => 'u',
        'ç' => 'c',
        other => other,
    }
}

/// A table of text cells exactly as imported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text, empty for short rows.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Drop rows whose cells are all blank (trailing spreadsheet lines).
    pub fn without_blank_rows(mut self) -> Self {
        self.rows
            .retain(|row| row.iter().any(|cell| !cell.trim().is_empty()));
        self
    }
}

/// Header index of each resolved column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<Column, usize>,
}

impl ColumnMap {
    /// Resolve headers against built-in and configured aliases.
    ///
    /// Explicit `Tolerance-` / `Tolerance+` columns take precedence over a
    /// symmetric `Tolerance` column; the symmetric column only fills in the
    /// side that is missing.
    pub fn resolve(
        headers: &[String],
        aliases: &HashMap<Column, Vec<String>>,
    ) -> Result<Self, SchemaError> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(SchemaError::EmptyHeader);
        }

        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut indices = HashMap::new();

        for column in Column::ALL {
            let mut candidates: Vec<String> = column
                .builtin_aliases()
                .iter()
                .map(|a| normalize_header(a))
                .collect();
            if let Some(extra) = aliases.get(&column) {
                candidates.extend(extra.iter().map(|a| normalize_header(a)));
            }

            // First matching header wins when a table repeats a column
            if let Some(index) = normalized.iter().position(|h| candidates.contains(h)) {
                indices.insert(column, index);
            }
        }

        let has_symmetric = indices.contains_key(&Column::Tolerance);
        let missing: Vec<Column> = Column::REQUIRED
            .into_iter()
            .filter(|column| !indices.contains_key(column))
            .filter(|column| {
                !(has_symmetric
                    && matches!(column, Column::ToleranceMinus | Column::TolerancePlus))
            })
            .collect();

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns { missing });
        }

        Ok(Self { indices })
    }

    pub fn index(&self, column: Column) -> Option<usize> {
        self.indices.get(&column).copied()
    }

    /// Whether a tolerance side is taken from the symmetric column.
    pub fn uses_symmetric(&self, side: Column) -> bool {
        !self.indices.contains_key(&side) && self.indices.contains_key(&Column::Tolerance)
    }
}
