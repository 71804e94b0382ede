//! `dimcheck template`: write the blank import template.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use dimcheck::config::Config;
use dimcheck::import::template_csv;

pub fn cmd_template(output: Option<&Path>, force: bool) -> Result<()> {
    let config = Config::load()?;
    let content = template_csv(config.import.delimiter_byte())?;

    match output {
        None => print!("{}", content),
        Some(path) => {
            write_template(path, &content, force)?;
            println!("{} Wrote template to {}", "✓".green(), path.display());
        }
    }

    Ok(())
}

fn write_template(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_template_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("measures.csv");

        write_template(&path, "a,b\n", false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");

        let err = write_template(&path, "c,d\n", false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        write_template(&path, "c,d\n", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "c,d\n");
    }
}
