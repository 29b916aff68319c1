//! Corruption recovery tests for the health-tracker binary.
//!
//! These tests verify the system can handle:
//! - Malformed history rows
//! - History files written before the activity column existed
//! - Unwritable data directories

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("health-tracker"));
    cmd.arg("--config")
        .arg(data_dir.join("config.toml"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("config.toml"), "").unwrap();
    (temp_dir, data_dir)
}

const HEADER: &str =
    "timestamp,name,age,gender,height_cm,weight_kg,bmi,category,bmr,tdee,water_l,activity";

#[test]
fn test_malformed_rows_are_skipped() {
    let (_temp_dir, data_dir) = setup_test_dir();
    fs::write(
        data_dir.join("health_history.csv"),
        format!(
            "{}\n\
             2024-01-01 08:00:00,Ada,30,Male,175.0,70.0,22.86,Normal weight,1074,1476,2.45,Light (1–3 days/wk)\n\
             2024-01-02 08:00:00,Ada,30,Male,175.0,70.0,oops,Normal weight,1074,1476,2.45,Light (1–3 days/wk)\n\
             garbage\n\
             2024-01-03 08:00:00,Ada,30,Male,175.0,72.0,23.51,Normal weight,1094,1504,2.52,Light (1–3 days/wk)\n",
            HEADER
        ),
    )
    .unwrap();

    cli(&data_dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries in"));

    cli(&data_dir)
        .arg("trend")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries plotted"));
}

#[test]
fn test_legacy_file_without_activity_column() {
    let (_temp_dir, data_dir) = setup_test_dir();
    fs::write(
        data_dir.join("health_history.csv"),
        "timestamp,name,age,gender,height_cm,weight_kg,bmi,category,bmr,tdee,water_l\n\
         2024-01-01 08:00:00,,30,F,165.0,60.0,22.04,Normal weight,1320.0,1815.0,2.1\n",
    )
    .unwrap();

    let output = cli(&data_dir)
        .args(["history", "--json"])
        .output()
        .expect("Failed to run history");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["gender"], "Female");
    assert_eq!(value["bmr"], 1320.0);
    assert!(value["activity"].is_null());
    assert!(value["name"].is_null());
}

#[test]
fn test_empty_history_file_gets_header_on_append() {
    let (_temp_dir, data_dir) = setup_test_dir();
    let csv_path = data_dir.join("health_history.csv");
    fs::write(&csv_path, "").unwrap();

    cli(&data_dir)
        .args([
            "calc", "--name", "", "--age", "50", "--gender", "f", "--height", "160",
            "--unit", "cm", "--weight", "80", "--activity", "5", "--save",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER);
    assert!(lines[1].contains(",31.25,Obese,"));
}

#[test]
fn test_unwritable_data_dir_reports_storage_error() {
    let (temp_dir, data_dir) = setup_test_dir();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("health-tracker"))
        .arg("--config")
        .arg(data_dir.join("config.toml"))
        .arg("--data-dir")
        .arg(blocker.join("data"))
        .args([
            "calc", "--name", "", "--age", "30", "--gender", "m", "--height", "175",
            "--unit", "cm", "--weight", "70", "--activity", "2", "--save",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("StorageUnavailable"));
}
