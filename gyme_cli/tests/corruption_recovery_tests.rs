//! Corruption recovery tests for gyme.
//!
//! These tests verify the system can handle:
//! - A corrupted profile file
//! - Corrupted lines in the record tables
//! - Missing files
//! - An invalid config file

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gyme").expect("Failed to find gyme binary");
    cmd.env("XDG_CONFIG_HOME", dir.path().join("config"))
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir_all(dir.path().join("data")).unwrap();
    dir
}

#[test]
fn test_corrupted_profile_falls_back_to_defaults() {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("data/profile.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted profile");

    cli(&temp_dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("60.0 kg"));

    // Setting up again replaces the corrupted file
    cli(&temp_dir)
        .args(["profile", "setup", "--weight", "80", "--height", "180", "--age", "30"])
        .assert()
        .success();

    let contents = fs::read_to_string(temp_dir.path().join("data/profile.json")).unwrap();
    let profile: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(profile["weight_kg"], 80.0);
    assert_eq!(profile["setup_done"], true);
}

#[test]
fn test_corrupted_workout_lines_ignored() {
    let temp_dir = setup_test_dir();
    let path = temp_dir.path().join("data/workouts.jsonl");

    // Seed, then damage the table
    cli(&temp_dir).args(["workout", "today"]).assert().success();
    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{{ invalid json }}").unwrap();
    writeln!(file, "{{\"id\": \"not-a-uuid\"}}").unwrap();
    drop(file);

    cli(&temp_dir)
        .args(["workout", "list", "--day", "tue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lat Pulldown"));

    // A rewrite drops the bad lines and keeps the good ones
    cli(&temp_dir).args(["workout", "reset"]).assert().success();
    let lines = fs::read_to_string(&path).unwrap().lines().count();
    assert_eq!(lines, 16);
}

#[test]
fn test_only_corrupted_lines_does_not_reseed_twice() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("data/workouts.jsonl"),
        "{ invalid json }\n{ more invalid }",
    )
    .unwrap();

    // An unreadable table counts as empty, so the program is seeded
    cli(&temp_dir)
        .args(["workout", "list", "--day", "wed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barbell Squat"));

    cli(&temp_dir)
        .args(["workout", "list", "--day", "wed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0/4 done"));
}

#[test]
fn test_corrupted_run_history() {
    let temp_dir = setup_test_dir();
    let path = temp_dir.path().join("data/runs.jsonl");
    fs::write(&path, "garbage\n\n").unwrap();

    cli(&temp_dir)
        .args(["run", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No runs recorded yet"));
}

#[test]
fn test_partial_meal_line_is_skipped() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["meal", "plan", "--seed", "1"])
        .assert()
        .success();

    // Simulate a torn write at the end of the table
    let path = temp_dir.path().join("data/meals.jsonl");
    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{{\"id\":\"7d0c").unwrap();
    drop(file);

    cli(&temp_dir)
        .args(["meal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Breakfast"));
}

#[test]
fn test_missing_data_dir_is_created() {
    let temp_dir = tempfile::tempdir().unwrap();

    cli(&temp_dir).args(["weight", "log", "70"]).assert().success();
    assert!(temp_dir.path().join("data/weights.jsonl").exists());
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[tracking]\nmax_accuracy_m = -1.0\n").unwrap();

    cli(&temp_dir)
        .arg("--config")
        .arg(&config_path)
        .args(["profile", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_partial_config_uses_defaults() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[metabolic]\ngoal_adjustment_kcal = 300\n").unwrap();

    cli(&temp_dir)
        .arg("--config")
        .arg(&config_path)
        .args(["profile", "setup", "--weight", "95", "--height", "175", "--age", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cutting"));
}
