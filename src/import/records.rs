//! JSON and YAML record-array import.
//!
//! Both formats are an array of objects, one object per row:
//!
//! ```yaml
//! - Characteristic: Ø10 H7
//!   Nominal: 10.0
//!   Tolerance-: -0.015
//!   Tolerance+: 0.0
//!   Measured: 9.988
//! ```
//!
//! Headers appear in order of first use across all records.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::table::RawTable;

pub fn parse_json(content: &str) -> Result<RawTable> {
    let value: Value = serde_json::from_str(content).context("Invalid JSON")?;
    from_value(value)
}

pub fn parse_yaml(content: &str) -> Result<RawTable> {
    // Round-trip through serde_json::Value so both formats share one walker
    let value: Value = serde_yaml::from_str(content).context("Invalid YAML")?;
    from_value(value)
}

fn from_value(value: Value) -> Result<RawTable> {
    let records = match value {
        Value::Array(records) => records,
        Value::Null => Vec::new(),
        other => anyhow::bail!(
            "Expected an array of row objects, found {}",
            value_kind(&other)
        ),
    };

    let mut headers: Vec<String> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let object = record.as_object().with_context(|| {
            format!("Row {} is {}, expected an object", index + 1, value_kind(record))
        })?;
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(headers);
    for record in &records {
        let row = table
            .headers
            .iter()
            .map(|header| record.get(header).map(cell_text).unwrap_or_default())
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_records() {
        let content = r#"[
            {"Characteristic": "Ø10 H7", "Nominal": 10.0, "Tolerance-": -0.015, "Tolerance+": 0, "Measured": 9.988},
            {"Characteristic": "Longueur A", "Nominal": 100, "Tolerance": 0.2, "Measured": null}
        ]"#;
        let table = parse_json(content).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.headers.contains(&"Tolerance".to_string()));

        let measured = table.headers.iter().position(|h| h == "Measured").unwrap();
        assert_eq!(table.cell(0, measured), "9.988");
        assert_eq!(table.cell(1, measured), "");

        let minus = table.headers.iter().position(|h| h == "Tolerance-").unwrap();
        assert_eq!(table.cell(1, minus), "");
    }

    #[test]
    fn test_parse_yaml_records() {
        let content = "- Characteristic: Bore\n  Nominal: 12\n  Tolerance: 0.05\n  Measured: 12.01\n";
        let table = parse_yaml(content).unwrap();
        assert_eq!(table.headers, vec!["Characteristic", "Nominal", "Tolerance", "Measured"]);
        assert_eq!(table.cell(0, 3), "12.01");
    }

    #[test]
    fn test_rejects_non_array() {
        let err = parse_json(r#"{"Nominal": 1}"#).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_rejects_non_object_row() {
        let err = parse_json("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("Row 1"));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_json("[]").unwrap().is_empty());
        assert!(parse_json("null").unwrap().is_empty());
    }
}
