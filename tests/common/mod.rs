//! Shared test infrastructure for integration tests.

use assert_cmd::Command;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

pub const HEADER: &str =
    "RF filter keywords,Keyword colors,Risk Score,Customer,Permutations,Notes\n";

fn manifest_dir() -> PathBuf {
    PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()))
}

/// LM command line that runs the checked-in mock through `sh`.
pub fn mock_lm_command() -> String {
    let script = manifest_dir().join("tests/mock-lm.sh");
    shell_words::join(["sh".to_string(), script.display().to_string()])
}

/// Scratch directory holding an input CSV and the eventual output.
pub struct Workspace {
    pub dir: TempDir,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn input(&self) -> PathBuf {
        self.path("input.csv")
    }

    pub fn output(&self) -> PathBuf {
        self.path("output.csv")
    }

    pub fn write_input(&self, bytes: &[u8]) {
        std::fs::write(self.input(), bytes).expect("write input");
    }

    pub fn read_output(&self) -> String {
        let bytes = std::fs::read(self.output()).expect("read output");
        String::from_utf8(bytes).expect("output is UTF-8")
    }

    /// `kwperm` run from the workspace root with no LM configured.
    pub fn kwperm_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("kwperm").expect("kwperm binary");
        cmd.current_dir(self.dir.path())
            .env_remove("KWPERM_LM_COMMAND")
            .env_remove("RUST_LOG")
            .arg("--no-progress");
        cmd
    }

    /// `kwperm` wired to this workspace and the mock LM.
    pub fn kwperm(&self) -> Command {
        let mut cmd = self.kwperm_bare();
        cmd.arg("--lm").arg(mock_lm_command());
        cmd
    }
}

/// Parse CSV output into rows of cells, header included.
pub fn rows(text: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(text.as_bytes());
    reader
        .records()
        .map(|row| {
            row.expect("valid CSV row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
