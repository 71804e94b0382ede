//! `dimcheck config`: show the effective configuration and where it came from.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use dimcheck::config::{global_config_path, Config};
use dimcheck::paths::CONFIG_FILE;
use dimcheck::ui;

pub fn cmd_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", ui::colors::heading("Configuration sources"));
    match global_config_path() {
        Some(path) => print_source(&path),
        None => println!("  {} global config directory unavailable", "•".yellow()),
    }
    print_source(Path::new(CONFIG_FILE));
    println!();

    let yaml = serde_yaml::to_string(&config).context("Failed to serialize config")?;
    print!("{}", yaml);

    Ok(())
}

fn print_source(path: &Path) {
    if path.exists() {
        println!("  {} {}", "✓".green(), path.display());
    } else {
        println!(
            "  {} {} {}",
            "•".dimmed(),
            path.display(),
            ui::colors::secondary("(not found, defaults apply)")
        );
    }
}
