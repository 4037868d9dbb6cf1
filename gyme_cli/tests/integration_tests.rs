//! Integration tests for the gyme binary.
//!
//! These tests verify end-to-end behavior including:
//! - Profile onboarding and the metabolic report
//! - Workout seeding and checklist updates
//! - Run tracking from a file of GPS fixes
//! - Meal plan generation and CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's config file
fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gyme").expect("Failed to find gyme binary");
    cmd.env("XDG_CONFIG_HOME", dir.path().join("config"))
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

fn setup_profile(dir: &TempDir) {
    cli(dir)
        .args(["profile", "setup", "--weight", "70", "--height", "175", "--age", "25"])
        .assert()
        .success();
}

/// Straight northward run: one fix every 20 s, ~55.6 m apart
fn write_fixes(path: &Path, count: usize, accuracy: f64) {
    let lines: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"lat":{},"lon":106.8,"accuracy_m":{},"at":"2024-05-01T06:{:02}:{:02}Z"}}"#,
                -6.2 + 0.0005 * i as f64,
                accuracy,
                (i * 20) / 60,
                (i * 20) % 60
            )
        })
        .collect();
    fs::write(path, lines.join("\n")).expect("Failed to write fixes");
}

fn read_jsonl(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .expect("Failed to read table")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("Invalid JSON line"))
        .collect()
}

#[test]
fn test_cli_help() {
    Command::cargo_bin("gyme")
        .expect("Failed to find gyme binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts, runs and meal plans"));
}

#[test]
fn test_profile_show_before_setup_uses_defaults() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not set up"))
        .stdout(predicate::str::contains("60.0 kg"));
}

#[test]
fn test_profile_setup_reports_metabolic_figures() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["profile", "setup", "--weight", "70", "--height", "175", "--age", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile saved"))
        .stdout(predicate::str::contains("22.9 (Normal)"))
        .stdout(predicate::str::contains("Maintenance"))
        .stdout(predicate::str::contains("2894 kcal/day"));

    let data_dir = temp_dir.path().join("data");
    assert!(data_dir.join("profile.json").exists());
    assert_eq!(read_jsonl(&data_dir.join("weights.jsonl")).len(), 1);
}

#[test]
fn test_profile_setup_rejects_bad_input() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["profile", "setup", "--weight", "abc", "--height", "175", "--age", "25"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));

    assert!(!temp_dir.path().join("data/profile.json").exists());
}

#[test]
fn test_profile_edit_changes_goal() {
    let temp_dir = setup_test_dir();
    setup_profile(&temp_dir);

    cli(&temp_dir)
        .args(["profile", "edit", "--weight", "95"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cutting"));

    let weights = read_jsonl(&temp_dir.path().join("data/weights.jsonl"));
    assert_eq!(weights.len(), 2);
}

#[test]
fn test_workout_list_seeds_program() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["workout", "list", "--day", "mon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bench Press"))
        .stdout(predicate::str::contains("0/4 done"));

    cli(&temp_dir)
        .args(["workout", "list", "--day", "sun"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rest day"));

    let workouts = read_jsonl(&temp_dir.path().join("data/workouts.jsonl"));
    assert_eq!(workouts.len(), 16);
}

#[test]
fn test_workout_checklist_flow() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir).args(["workout", "today"]).assert().success();

    let workouts = read_jsonl(&temp_dir.path().join("data/workouts.jsonl"));
    let bench = workouts
        .iter()
        .find(|w| w["exercise_name"] == "Bench Press")
        .expect("Bench Press seeded");
    let id = bench["id"].as_str().unwrap().to_string();

    cli(&temp_dir)
        .args(["workout", "done", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("marked done"));

    cli(&temp_dir)
        .args(["workout", "weight", &id, "40"])
        .assert()
        .success();

    cli(&temp_dir)
        .args(["workout", "list", "--day", "monday"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] Bench Press"))
        .stdout(predicate::str::contains("weight: 40.0 kg"));

    cli(&temp_dir)
        .args(["workout", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset 1 exercises"));

    cli(&temp_dir)
        .args(["workout", "delete", &id])
        .assert()
        .success();

    cli(&temp_dir)
        .args(["workout", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_workout_add_requires_name() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["workout", "add", "--name", "", "--muscle", "Chest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));

    cli(&temp_dir)
        .args(["workout", "add", "--name", "Dips", "--muscle", "Tricep", "--day", "sat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Dips on Saturday"));

    cli(&temp_dir)
        .args(["workout", "list", "--day", "sat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 Sets x 12 Reps"));
}

#[test]
fn test_run_track_saves_run() {
    let temp_dir = setup_test_dir();
    setup_profile(&temp_dir);
    let fixes = temp_dir.path().join("fixes.jsonl");
    write_fixes(&fixes, 10, 5.0);

    cli(&temp_dir)
        .args(["run", "track", "--fixes"])
        .arg(&fixes)
        .assert()
        .success()
        .stdout(predicate::str::contains("Run saved"))
        .stdout(predicate::str::contains("Distance: 0.50 km"))
        .stdout(predicate::str::contains("Calories: 36 kcal"));

    let runs = read_jsonl(&temp_dir.path().join("data/runs.jsonl"));
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["path"].as_array().unwrap().len(), 10);

    cli(&temp_dir)
        .args(["run", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.50 km"));

    let id = runs[0]["id"].as_str().unwrap();
    cli(&temp_dir)
        .args(["run", "show", id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Path (10 points)"));
}

#[test]
fn test_run_track_drops_inaccurate_fixes() {
    let temp_dir = setup_test_dir();
    let fixes = temp_dir.path().join("fixes.jsonl");
    write_fixes(&fixes, 10, 50.0);

    cli(&temp_dir)
        .args(["run", "track", "--weight", "70", "--fixes"])
        .arg(&fixes)
        .assert()
        .success()
        .stdout(predicate::str::contains("Run too short"));

    assert!(!temp_dir.path().join("data/runs.jsonl").exists());
}

#[test]
fn test_run_track_without_location_fails() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["run", "track", "--fixes"])
        .arg(temp_dir.path().join("missing.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Location permission denied"));
}

#[test]
fn test_meal_plan_replaces_today() {
    let temp_dir = setup_test_dir();
    setup_profile(&temp_dir);

    cli(&temp_dir)
        .args(["meal", "plan", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Maintenance plan"))
        .stdout(predicate::str::contains("Breakfast"))
        .stdout(predicate::str::contains("Target:    2894 kcal"));

    let meals_path = temp_dir.path().join("data/meals.jsonl");
    let first = read_jsonl(&meals_path).len();

    cli(&temp_dir)
        .args(["meal", "plan", "--seed", "7"])
        .assert()
        .success();
    assert_eq!(read_jsonl(&meals_path).len(), first);

    cli(&temp_dir)
        .args(["meal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dinner"));
}

#[test]
fn test_weight_log_and_trend() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir).args(["weight", "log", "72.5"]).assert().success();
    cli(&temp_dir).args(["weight", "log", "71.5"]).assert().success();
    cli(&temp_dir)
        .args(["weight", "log", "0"])
        .assert()
        .failure();

    cli(&temp_dir)
        .args(["weight", "trend"])
        .assert()
        .success()
        .stdout(predicate::str::contains("72.5 kg"))
        .stdout(predicate::str::contains("-1.0"));

    cli(&temp_dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight:   71.5 kg"));
}

#[test]
fn test_export_writes_csv_files() {
    let temp_dir = setup_test_dir();
    setup_profile(&temp_dir);
    let fixes = temp_dir.path().join("fixes.jsonl");
    write_fixes(&fixes, 10, 5.0);
    cli(&temp_dir)
        .args(["run", "track", "--fixes"])
        .arg(&fixes)
        .assert()
        .success();

    let out = temp_dir.path().join("export");
    cli(&temp_dir)
        .args(["export", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 runs"))
        .stdout(predicate::str::contains("Exported 1 weight entries"));

    let runs_csv = fs::read_to_string(out.join("runs.csv")).unwrap();
    assert_eq!(runs_csv.lines().count(), 2);
    assert!(runs_csv.starts_with("id,recorded_at,distance_km"));
    assert!(out.join("weights.csv").exists());
}
