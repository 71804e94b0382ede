use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Sample table: two conforming rows, one non-conforming, one undetermined.
#[allow(dead_code)]
pub const SAMPLE_CSV: &str = "\
Characteristic,Nominal,Tolerance-,Tolerance+,Measured
Ø10 H7,10.0,-0.015,0.0,9.988
Longueur A,100.0,-0.2,0.2,100.12
Ø10 H7 bis,10.0,-0.015,0.0,10.002
Bore C,25.0,-0.05,0.05,
";

/// Isolated project directory with its own HOME, so no global config leaks in.
pub struct TestHarness {
    pub dir: TempDir,
    #[allow(dead_code)]
    pub config_path: PathBuf,
    pub dimcheck_binary: PathBuf,
}

impl TestHarness {
    /// Creates a harness with an empty `.dimcheck/config.md`.
    pub fn new() -> Self {
        Self::with_config("---\n---\n\n# Test config\n")
    }

    /// Creates a harness with custom project config content.
    pub fn with_config(config_content: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_path = temp_dir.path();

        let config_path = base_path.join(".dimcheck/config.md");
        fs::create_dir_all(base_path.join(".dimcheck/templates"))
            .expect("Failed to create .dimcheck dir");
        fs::create_dir_all(base_path.join("home")).expect("Failed to create home dir");
        fs::write(&config_path, config_content).expect("Failed to write config");

        TestHarness {
            dir: temp_dir,
            config_path,
            dimcheck_binary: PathBuf::from(env!("CARGO_BIN_EXE_dimcheck")),
        }
    }

    /// Returns the project directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a file relative to the project directory.
    #[allow(dead_code)]
    pub fn write(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Runs the dimcheck binary in the project directory with stdin closed.
    #[allow(dead_code)]
    pub fn run(&self, args: &[&str]) -> Output {
        let home = self.path().join("home");
        Command::new(&self.dimcheck_binary)
            .args(args)
            .current_dir(self.path())
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("NO_COLOR", "1")
            .env("CLICOLOR", "0")
            .env_remove("RUST_LOG")
            .env_remove("DIMCHECK_QUIET")
            .stdin(Stdio::null())
            .output()
            .expect("Failed to run dimcheck")
    }

    /// Files in a directory, sorted by name.
    #[allow(dead_code)]
    pub fn files_in(&self, dir: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path().join(dir))
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().is_file())
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[allow(dead_code)]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[allow(dead_code)]
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
