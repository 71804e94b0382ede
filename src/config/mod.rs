//! Configuration management for dimcheck projects.
//!
//! Configuration lives in markdown files with YAML frontmatter:
//!
//! ```markdown
//! ---
//! project:
//!   name: line-3
//! evaluation:
//!   undefined_policy: fail
//! columns:
//!   measured: [Relevé]
//! report:
//!   formats: [docx, pdf]
//!   output_dir: ~/reports
//! ---
//!
//! # Inspection settings
//! ```
//!
//! Both files are optional; missing sections fall back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::evaluate::EvaluateOptions;
use crate::paths::CONFIG_FILE;

pub mod defaults;
pub mod validation;

pub use defaults::*;
pub use validation::*;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub columns: ColumnAliases,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration with full merge semantics.
    /// Merge order (later overrides earlier):
    /// 1. Global config (~/.config/dimcheck/config.md)
    /// 2. Project config (.dimcheck/config.md)
    pub fn load() -> Result<Self> {
        Self::load_merged_from(global_config_path().as_deref(), Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let frontmatter = split_frontmatter(content)
            .0
            .context("Failed to extract frontmatter from config")?;

        let config: Config = if frontmatter.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&frontmatter).context("Failed to parse config frontmatter")?
        };

        config.validate()?;

        Ok(config)
    }

    /// Load merged configuration from the given global and project paths.
    /// Either file may be absent.
    pub fn load_merged_from(global_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let global_config = global_path
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?
            .unwrap_or_default();

        let project_config = Some(project_path)
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?
            .unwrap_or_default();

        let config = global_config.merge_with(project_config);
        config.validate()?;

        tracing::debug!(
            global = ?global_path,
            project = %project_path.display(),
            "configuration loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.import.validate()?;
        self.report.validate()
    }

    /// Evaluator options derived from this configuration.
    pub fn evaluate_options(&self) -> EvaluateOptions {
        EvaluateOptions {
            policy: self.evaluation.undefined_policy,
            aliases: self.columns.clone(),
        }
    }

    /// Report output directory with `~` expanded.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.report.output_dir).to_string())
    }

    /// Render this configuration as a config.md document.
    pub fn to_markdown(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config")?;
        Ok(format!("---\n{}---\n\n# dimcheck configuration\n", yaml))
    }
}

/// Returns the path to the global config file at ~/.config/dimcheck/config.md
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dimcheck").join("config.md"))
}

/// Split `---` delimited YAML frontmatter from the markdown body.
pub fn split_frontmatter(content: &str) -> (Option<String>, &str) {
    let content = content.trim();

    if !content.starts_with("---") {
        return (None, content);
    }

    let rest = &content[3..];
    if let Some(end) = rest.find("\n---") {
        let frontmatter = rest[..end].to_string();
        let body = rest[end + 4..].trim_start();
        (Some(frontmatter), body)
    } else {
        (None, content)
    }
}

/// Partial config for merging - all fields optional
#[derive(Debug, Deserialize, Default)]
struct PartialConfig {
    pub project: Option<ProjectConfig>,
    pub evaluation: Option<EvaluationConfig>,
    pub import: Option<ImportConfig>,
    pub columns: Option<ColumnAliases>,
    pub report: Option<PartialReportConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct PartialReportConfig {
    pub title: Option<String>,
    pub company: Option<String>,
    pub formats: Option<Vec<crate::report::ReportFormat>>,
    pub file_prefix: Option<String>,
    pub output_dir: Option<String>,
    pub decimals: Option<usize>,
    pub date_format: Option<String>,
}

impl PartialConfig {
    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let (frontmatter, _body) = split_frontmatter(content);
        let frontmatter = frontmatter.context("Failed to extract frontmatter from config")?;

        // An empty frontmatter block is valid and means "all defaults"
        if frontmatter.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&frontmatter).context("Failed to parse config frontmatter")
    }

    /// Merge this global config with a project config, returning the merged result.
    /// Values from the project config take precedence over global.
    fn merge_with(self, project: PartialConfig) -> Config {
        let global_report = self.report.unwrap_or_default();
        let project_report = project.report.unwrap_or_default();

        // Column aliases accumulate: project spellings are added to global ones
        let mut columns = self.columns.unwrap_or_default();
        for (column, aliases) in project.columns.unwrap_or_default() {
            let entry = columns.entry(column).or_default();
            for alias in aliases {
                if !entry.contains(&alias) {
                    entry.push(alias);
                }
            }
        }

        Config {
            project: project.project.or(self.project).unwrap_or_default(),
            evaluation: project.evaluation.or(self.evaluation).unwrap_or_default(),
            import: project.import.or(self.import).unwrap_or_default(),
            columns,
            report: ReportConfig {
                // Project value > global value > default
                title: project_report
                    .title
                    .or(global_report.title)
                    .unwrap_or_else(defaults::default_report_title),
                company: project_report.company.or(global_report.company),
                formats: project_report
                    .formats
                    .or(global_report.formats)
                    .unwrap_or_else(defaults::default_formats),
                file_prefix: project_report
                    .file_prefix
                    .or(global_report.file_prefix)
                    .unwrap_or_else(defaults::default_file_prefix),
                output_dir: project_report
                    .output_dir
                    .or(global_report.output_dir)
                    .unwrap_or_else(defaults::default_output_dir),
                decimals: project_report
                    .decimals
                    .or(global_report.decimals)
                    .unwrap_or_else(defaults::default_decimals),
                date_format: project_report
                    .date_format
                    .or(global_report.date_format)
                    .unwrap_or_else(defaults::default_date_format),
            },
        }
    }
}
