#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use goaltree::goal::GoalDocument;
use serde_json::Value;
use tempfile::TempDir;

/// Scratch directory holding a goals file and, optionally, a config.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join("goals_data.json")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_document(&self) -> Result<GoalDocument, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.data_file())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// `goaltree` running inside this directory, isolated from the user's config.
    pub fn cmd(&self) -> Command {
        let mut cmd = goaltree_cmd();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env_remove("GOALTREE_FILE")
            .env_remove("GOALTREE_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run a command with `--json` and return the parsed envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json output")
    }

    pub fn add(&self, title: &str, parent: Option<u64>) -> u64 {
        let parent = parent.map(|p| p.to_string());
        let mut args = vec!["add", title];
        if let Some(parent) = parent.as_deref() {
            args.extend(["--parent", parent]);
        }
        self.json(&args)["data"]["id"].as_u64().expect("goal id")
    }
}

pub fn goaltree_cmd() -> Command {
    Command::cargo_bin("goaltree").expect("binary")
}
