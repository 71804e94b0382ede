//! # dimcheck - dimensional inspection
//!
//! dimcheck reads a table of inspected characteristics (nominal dimension,
//! lower and upper tolerance, measured value), decides for each row whether
//! the measurement conforms, and writes an inspection report (PV) as Word,
//! PDF, Markdown, CSV or JSON.
//!
//! ## Core Concepts
//!
//! - **Rows**: one characteristic with nominal, tolerances and measured value
//! - **Bounds**: `nominal + tolerance-` and `nominal + tolerance+`, inclusive
//! - **Verdict**: conforming, non-conforming, or undetermined when a number is missing
//!
//! ## Modules
//!
//! - [`measurement`] - Row model, number coercion and the bounds check
//! - [`table`] - Raw imported tables and column resolution
//! - [`evaluate`] - Conformity evaluation and summary counts
//! - [`import`] - CSV, JSON and YAML importers
//! - [`drawing`] - Reference drawings attached to reports
//! - [`report`] - Report renderers
//! - [`config`] - Configuration management for dimcheck projects
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use dimcheck::config::Config;
//! use dimcheck::evaluate::evaluate;
//! use dimcheck::import::load_table;
//!
//! let config = Config::load().expect("Failed to load config");
//! let table = load_table(Path::new("measures.csv"), None, config.import.delimiter_byte())
//!     .expect("Failed to load table");
//! let evaluation = evaluate(&table, &config.evaluate_options()).expect("Missing columns");
//!
//! println!(
//!     "{}/{} conforming",
//!     evaluation.summary.passing, evaluation.summary.total
//! );
//! ```

pub mod config;
pub mod drawing;
pub mod evaluate;
pub mod formatters;
pub mod import;
pub mod measurement;
pub mod report;
pub mod table;
pub mod ui;

/// Default path constants for the dimcheck directory structure.
pub mod paths {
    /// Project directory: `.dimcheck`
    pub const DIMCHECK_DIR: &str = ".dimcheck";
    /// Project configuration file: `.dimcheck/config.md`
    pub const CONFIG_FILE: &str = ".dimcheck/config.md";
    /// Report template overrides: `.dimcheck/templates`
    pub const TEMPLATES_DIR: &str = ".dimcheck/templates";
}
