//! `dimcheck init`: create the project configuration.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use dimcheck::paths::{CONFIG_FILE, DIMCHECK_DIR, TEMPLATES_DIR};

const CONFIG_TEMPLATE: &str = r#"---
project:
  name: {{name}}

evaluation:
  # exclude: undetermined rows count neither as passing nor as failing
  # fail: undetermined rows count as failing
  undefined_policy: exclude

import:
  delimiter: ","

# Extra header spellings per column, matched ignoring case and accents
columns:
  measured: []

report:
  title: Dimensional Inspection Report
  formats: [docx, pdf]
  file_prefix: PV_controle
  output_dir: .
  decimals: 6
---

# dimcheck configuration

Settings in the frontmatter above override `~/.config/dimcheck/config.md`.
Put a `report.md` template in `.dimcheck/templates/` to customise the
Markdown report.
"#;

/// What `init` did
#[derive(Debug, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Overwritten,
    AlreadyInitialized,
}

pub fn cmd_init(name: Option<String>, force: bool) -> Result<()> {
    let name = name
        .or_else(detect_project_name)
        .unwrap_or_else(|| "my-project".to_string());

    match init_in(Path::new("."), &name, force)? {
        InitOutcome::Created => {
            println!("{} Initialized dimcheck in {}/", "Done!".green(), DIMCHECK_DIR);
            println!("  {} {}", "✓".green(), CONFIG_FILE);
            println!("  {} {}/", "✓".green(), TEMPLATES_DIR);
        }
        InitOutcome::Overwritten => {
            println!("{} Rewrote {} with defaults", "Done!".green(), CONFIG_FILE);
        }
        InitOutcome::AlreadyInitialized => {
            println!(
                "{} {} already exists. Use {} to overwrite.",
                "•".yellow(),
                CONFIG_FILE,
                "--force".cyan()
            );
        }
    }

    Ok(())
}

/// Create `.dimcheck/` under `root`.
pub fn init_in(root: &Path, name: &str, force: bool) -> Result<InitOutcome> {
    let config_path = root.join(CONFIG_FILE);
    let existed = config_path.exists();
    if existed && !force {
        return Ok(InitOutcome::AlreadyInitialized);
    }

    let templates_dir = root.join(TEMPLATES_DIR);
    fs::create_dir_all(&templates_dir)
        .with_context(|| format!("Failed to create {}", templates_dir.display()))?;

    fs::write(&config_path, render_config(name)?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(if existed {
        InitOutcome::Overwritten
    } else {
        InitOutcome::Created
    })
}

fn render_config(name: &str) -> Result<String> {
    // serde_yaml quotes the name when it needs it
    let name = serde_yaml::to_string(name).context("Failed to serialize project name")?;
    Ok(CONFIG_TEMPLATE.replace("{{name}}", name.trim_end()))
}

/// Project name from the current directory name
fn detect_project_name() -> Option<String> {
    std::env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
}
