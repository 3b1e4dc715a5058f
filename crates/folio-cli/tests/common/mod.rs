#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;
use url::Url;

/// An isolated store directory plus a HOME for the CLI.
pub struct Sandbox {
    dir: TempDir,
    pub store_url: String,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("store");
        std::fs::create_dir_all(&store_path).unwrap();
        let store_url = Url::from_directory_path(&store_path)
            .expect("Failed to convert path to file URL")
            .to_string();
        Self { dir, store_url }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("collections.json")
    }

    fn command(&self, args: &[&str]) -> Command {
        let home = self.dir.path().join("home");
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_folio"));
        cmd.args(args);
        cmd.env("HOME", &home);
        cmd.env("XDG_CONFIG_HOME", home.join("config"));
        cmd.env("XDG_DATA_HOME", home.join("data"));
        cmd.env("FOLIO_STORE", &self.store_url);
        cmd.env("FOLIO_CONFIG", self.config_path());
        cmd.env_remove("FOLIO_TOKEN");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Run the CLI binary with arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to execute CLI")
    }

    /// Run the CLI with `input` on stdin.
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn CLI");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().expect("Failed to wait for CLI")
    }

    /// Run the CLI and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run with `--json` and return the `data` of a successful outcome.
    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let stdout = self.run_success(&full);
        let outcome: Value = serde_json::from_str(stdout.trim()).expect("stdout is JSON");
        assert_eq!(outcome["success"], Value::Bool(true), "outcome: {outcome}");
        outcome["data"].clone()
    }
}

/// `(title, order)` pairs from a JSON listing.
pub fn layout(listing: &Value) -> Vec<(String, i64)> {
    listing
        .as_array()
        .expect("listing is an array")
        .iter()
        .map(|doc| {
            (
                doc["fields"]["title"].as_str().unwrap_or_default().to_string(),
                doc["fields"]["order"].as_i64().unwrap_or(-1),
            )
        })
        .collect()
}

pub fn pairs(expected: &[(&str, i64)]) -> Vec<(String, i64)> {
    expected
        .iter()
        .map(|(t, o)| (t.to_string(), *o))
        .collect()
}
