//! Shared integration-test harness for running the `arrowgrid` binary.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

/// Runs `arrowgrid` with `args` and waits for it to exit.
#[allow(clippy::missing_panics_doc)]
pub fn arrowgrid(args: &[&str]) -> Output {
    arrowgrid_with_stdin(args, "")
}

/// Runs `arrowgrid` with `args`, feeding `input` on stdin.
#[allow(clippy::missing_panics_doc)]
pub fn arrowgrid_with_stdin(args: &[&str], input: &str) -> Output {
    let bin = env!("CARGO_BIN_EXE_arrowgrid");
    let mut child = Command::new(bin)
        .args(args)
        .env_remove("ARROWGRID_CONFIG")
        .env_remove("ARROWGRID_LOG_LEVEL")
        .env_remove("ARROWGRID_LOG_FILE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn arrowgrid");

    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for arrowgrid")
}

/// Writes `contents` to a temporary YAML file.
#[allow(clippy::missing_panics_doc)]
pub fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

/// Parses every non-empty line of `text` as JSON.
#[allow(clippy::missing_panics_doc)]
pub fn jsonl(text: &str) -> Vec<serde_json::Value> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("invalid JSON: {e}\nline: {l}")))
        .collect()
}

/// Returns the path as `&str`.
#[allow(clippy::missing_panics_doc)]
pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("non-UTF-8 path")
}
