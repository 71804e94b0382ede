//! Validation logic for configuration values.

use anyhow::Result;
use chrono::format::{Item, StrftimeItems};

use super::defaults::{ImportConfig, ReportConfig};

/// Upper limit for `report.decimals`; f64 carries ~15 significant digits
pub const MAX_DECIMALS: usize = 12;

impl ImportConfig {
    /// Validate import configuration
    pub fn validate(&self) -> Result<()> {
        let valid = matches!(self.delimiter.as_str(), "\\t" | "tab")
            || (self.delimiter.len() == 1 && self.delimiter.is_ascii());
        if !valid {
            anyhow::bail!(
                "import.delimiter must be a single ASCII character (or \"tab\"), got {:?}",
                self.delimiter
            );
        }

        Ok(())
    }
}

impl ReportConfig {
    /// Validate report configuration
    pub fn validate(&self) -> Result<()> {
        if self.decimals > MAX_DECIMALS {
            anyhow::bail!(
                "report.decimals must be at most {}, got {}",
                MAX_DECIMALS,
                self.decimals
            );
        }

        if self.file_prefix.trim().is_empty() {
            anyhow::bail!("report.file_prefix must not be empty");
        }

        if self
            .file_prefix
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        {
            anyhow::bail!(
                "report.file_prefix contains a character not allowed in file names: {:?}",
                self.file_prefix
            );
        }

        if self.date_format.trim().is_empty() {
            anyhow::bail!("report.date_format must not be empty");
        }

        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!(
                "report.date_format is not a valid strftime pattern: {:?}",
                self.date_format
            );
        }

        Ok(())
    }
}
