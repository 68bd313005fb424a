use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

/// Runs the `cadence` binary against a throwaway database and working directory
pub struct CliTestHarness {
    temp_dir: TempDir,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    /// Writes a `cadence.toml` picked up by every later command
    pub fn with_config(self, contents: &str) -> Self {
        std::fs::write(self.temp_dir.path().join("cadence.toml"), contents)
            .expect("Failed to write config");
        self
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("cadence").expect("Failed to find cadence binary");
        cmd.current_dir(self.temp_dir.path())
            .env("CADENCE_DATABASE_PATH", self.db_path())
            .env("CADENCE_TIMEZONE", "UTC")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        self.dir().join("test.db")
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs a successful command and returns its stdout
    pub fn stdout(&self, args: &[&str]) -> String {
        let output = self.run_success(args).get_output().stdout.clone();
        String::from_utf8(output).expect("stdout is not UTF-8")
    }

    /// Ids of the occurrences dated in `[from, to]`, in date order
    pub fn occurrence_ids(&self, from: &str, to: &str) -> Vec<Uuid> {
        ids_in(&self.stdout(&["list", "--from", from, "--to", to]))
    }
}

/// Every UUID printed in `output`, in order of appearance
pub fn ids_in(output: &str) -> Vec<Uuid> {
    output
        .split(|c: char| !(c.is_ascii_hexdigit() || c == '-'))
        .filter(|token| token.len() == 36)
        .filter_map(|token| Uuid::parse_str(token).ok())
        .collect()
}

/// Sample series arguments
pub struct TestFixtures;

impl TestFixtures {
    /// Paid every other Friday, six paydays in the first quarter of 2026
    pub fn biweekly_paycheck_args() -> Vec<&'static str> {
        vec![
            "series", "add", "Paycheck",
            "--amount", "2150.00",
            "--start", "2026-01-02",
            "--until", "2026-03-13",
            "--every", "weekly",
            "--interval", "2",
            "--weekday", "fri",
        ]
    }

    /// Rent due on the first of every month in 2026
    pub fn monthly_rent_args() -> Vec<&'static str> {
        vec![
            "series", "add", "Rent",
            "--kind", "expense",
            "--amount", "1200",
            "--start", "2026-01-01",
            "--until", "2026-12-01",
            "--every", "monthly",
            "--day", "1",
        ]
    }
}

pub mod assertions {
    use predicates::prelude::*;

    pub fn created_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓")
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
