//! Delimited text import and export.

use anyhow::{Context, Result};

use crate::table::RawTable;

/// Parse delimited text with a header row.
///
/// Rows may be shorter or longer than the header; cells are trimmed and a
/// UTF-8 byte order mark on the first header is dropped.
pub fn parse(content: &str, delimiter: u8) -> Result<RawTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = RawTable::new(headers);
    for (index, record) in reader.records().enumerate() {
        // Line numbers are 1-based and the header is line 1
        let record = record.with_context(|| format!("Malformed record on line {}", index + 2))?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

/// Write a table as delimited text, quoting fields only when needed.
pub fn write(table: &RawTable, delimiter: u8) -> Result<String> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
