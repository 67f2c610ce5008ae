use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CLEAN: &str = r#"<table id="q1"><caption>Q1</caption>
    <thead><tr><th>Region</th></tr></thead>
    <tbody><tr><td>10</td><td>abc</td><td>5</td></tr></tbody>
    <tfoot><tr><td>Creation: 15Jan2024 Germany</td></tr></tfoot>
</table>"#;

const NO_BODY: &str = r#"<table id="q2"><caption>Q2</caption>
    <thead><tr><th>Region</th></tr></thead>
    <tfoot><tr><td>Creation: 15Jan2024 Germany</td></tr></tfoot>
</table>"#;

fn empty_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, "{}").unwrap();
    path
}

fn reportlint(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reportlint").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn test_check_json_output() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);
    let input = dir.path().join("q1.html");
    fs::write(&input, CLEAN).unwrap();

    reportlint(&config)
        .args(["check", "--max-date", "2024-01-15"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""country": "Germany""#))
        .stdout(predicate::str::contains(r#""creation_date": "15-01-2024""#));
}

#[test]
fn test_check_strict_fails_on_discrepancy() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);
    let input = dir.path().join("q2.html");
    fs::write(&input, NO_BODY).unwrap();

    reportlint(&config)
        .args(["check", "--format", "text", "--strict", "--max-date", "2024-12-31"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Row-Sum"))
        .stdout(predicate::str::contains("NOT_FOUND"));
}

#[test]
fn test_check_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);

    reportlint(&config)
        .args(["check", "absent.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_run_stores_results_and_writes_summary() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);
    let input = dir.path().join("reports");
    let data = dir.path().join("data");
    let summary = dir.path().join("summary.csv");

    fs::create_dir(&input).unwrap();
    fs::write(input.join("q1.html"), CLEAN).unwrap();
    fs::write(input.join("q2.html"), NO_BODY).unwrap();

    reportlint(&config)
        .args(["run", "--max-date", "2024-01-31", "--workers", "2"])
        .arg(&input)
        .arg("--data-dir")
        .arg(&data)
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("Validated 2 reports"));

    let documents = fs::read_to_string(data.join("documents.jsonl")).unwrap();
    assert_eq!(documents.lines().count(), 2);

    let discrepancies = fs::read_to_string(data.join("discrepancies.jsonl")).unwrap();
    assert_eq!(discrepancies.lines().count(), 1);
    assert!(discrepancies.contains(r#""discrepancy_type":"Row-Sum""#));

    let csv = fs::read_to_string(&summary).unwrap();
    let rows: Vec<_> = csv.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[1].starts_with("q2.html,"));
    assert!(rows[1].contains("Row-Sum,NOT_FOUND"));
}

#[test]
fn test_run_memory_store_leaves_no_files() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);
    let input = dir.path().join("reports");
    let data = dir.path().join("data");

    fs::create_dir(&input).unwrap();
    fs::write(input.join("q1.html"), CLEAN).unwrap();

    reportlint(&config)
        .args(["run", "--store", "memory", "--max-date", "2024-01-31"])
        .arg(&input)
        .arg("--data-dir")
        .arg(&data)
        .assert()
        .success();

    assert!(!data.exists());
}

#[test]
fn test_run_empty_directory() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);

    reportlint(&config)
        .arg("run")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No .html files found"));
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("conf").join("config.json");

    reportlint(&config)
        .args(["config", "set", "validation.header_max_length", "42"])
        .assert()
        .success();

    reportlint(&config)
        .args(["config", "get", "validation.header_max_length"])
        .assert()
        .success()
        .stdout(predicate::str::diff("42\n"));

    reportlint(&config)
        .args(["config", "get", "validation.unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);

    reportlint(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    reportlint(&config)
        .args(["config", "init", "--force"])
        .assert()
        .success();

    let written = fs::read_to_string(&config).unwrap();
    assert!(written.contains("\"footer_tag\": \"tfoot\""));
}
