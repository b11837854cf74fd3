//! End-to-end tests for the `topn` binary.
//!
//! Each test runs the binary as a subprocess against files in a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn topn_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("topn"));
    cmd.env("TOPN_LOG", "error");
    cmd
}

fn write_input(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("input.txt");
    fs::write(&path, body).expect("write input");
    path
}

const SCENARIO: &str = "http://x/a 5\nhttp://x/b 9\nhttp://x/c 1\nhttp://x/d 7\n";

#[test]
fn batch_top_two_descending() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), SCENARIO);
    topn_cmd()
        .arg("-i")
        .arg(&input)
        .args(["-n", "2", "--batch-size", "3"])
        .assert()
        .success()
        .stdout("http://x/b\nhttp://x/d\n");
}

#[test]
fn batch_ascending_verbose() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), SCENARIO);
    topn_cmd()
        .arg("-i")
        .arg(&input)
        .args(["-n", "2", "-s", "asc", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[0]  key = http://x/c, value = 1  (delta = 0)"))
        .stdout(predicate::str::contains("[1]  key = http://x/a, value = 5  (delta = 4)"));
}

#[test]
fn batch_json_output() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), SCENARIO);
    let output = topn_cmd()
        .arg("-i")
        .arg(&input)
        .args(["-n", "3", "--json"])
        .output()
        .expect("run topn");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["mode"], "batch");
    assert_eq!(json["seen"], 4);
    let values: Vec<i64> = json["records"]
        .as_array()
        .expect("records array")
        .iter()
        .filter_map(|r| r["value"].as_i64())
        .collect();
    assert_eq!(values, vec![9, 7, 5]);
}

#[test]
fn sample_mode_too_few_records_fails() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "a 1\nb 2\nc 3\n");
    topn_cmd()
        .arg("-i")
        .arg(&input)
        .args(["--mode", "sample", "-n", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("need at least 5"))
        .stderr(predicate::str::contains("partial reservoir (3 slots)"));
}

#[test]
fn failed_run_warns_then_dumps_partial_state_to_stderr() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "a 1\nb 2\nc 3\n");
    topn_cmd()
        .env("TOPN_LOG", "topn=warn")
        .env("TOPN_LOG_FORMAT", "json")
        .arg("-i")
        .arg(&input)
        .args(["--mode", "sample", "-n", "5"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains(r#""level":"WARN""#))
        .stderr(predicate::str::contains("run failed; reporting partial state"))
        .stderr(predicate::str::contains("partial reservoir (3 slots)"));
}

#[test]
fn batch_shortfall_is_logged_without_touching_stdout() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), SCENARIO);
    topn_cmd()
        .env("TOPN_LOG", "topn=info")
        .env("TOPN_LOG_FORMAT", "json")
        .arg("-i")
        .arg(&input)
        .args(["-n", "10"])
        .assert()
        .success()
        .stdout("http://x/b\nhttp://x/d\nhttp://x/a\nhttp://x/c\n")
        .stderr(predicate::str::contains("fewer records than requested"))
        .stderr(predicate::str::contains(r#""available":4"#));
}

#[test]
fn invalid_utf8_line_is_reported_with_line_number() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("input.txt");
    fs::write(&path, b"a 1\nk\xff 2\n").expect("write input");
    topn_cmd()
        .arg("-i")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse error at line 2"));
}

#[test]
fn generate_then_sample_with_histogram() {
    let dir = TempDir::new().expect("tempdir");
    let data = dir.path().join("data.txt");
    topn_cmd()
        .args(["-g", "100", "--seed", "7", "-o"])
        .arg(&data)
        .assert()
        .success();
    let body = fs::read_to_string(&data).expect("generated file");
    assert_eq!(body.lines().count(), 100);

    let output = topn_cmd()
        .arg("-i")
        .arg(&data)
        .args(["--mode", "sample", "-n", "10", "--buckets", "4", "--seed", "1", "--json"])
        .output()
        .expect("run topn");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["total_items_read"], 100);
    let buckets = json["histogram"]["buckets"].as_array().expect("buckets");
    let bounds: Vec<u64> = buckets.iter().filter_map(|b| b["upper_bound"].as_u64()).collect();
    assert_eq!(bounds, vec![25, 50, 75, 100]);
    let total: u64 = buckets.iter().filter_map(|b| b["count"].as_u64()).sum();
    assert_eq!(total, 10);
}

#[test]
fn malformed_line_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "a 1\nb two\nc 3\n");
    topn_cmd()
        .arg("-i")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse error at line 2"));
}

#[test]
fn require_url_rejects_plain_keys() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "plain 1\n");
    topn_cmd()
        .arg("-i")
        .arg(&input)
        .arg("--require-url")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a URL"));
}

#[test]
fn zero_count_is_a_config_error() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), SCENARIO);
    topn_cmd()
        .arg("-i")
        .arg(&input)
        .args(["-n", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("result count must be > 0"));
}

#[test]
fn missing_input_fails() {
    topn_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input file"));
}
