//! Integration tests for the fitflex binary.
//!
//! These tests verify end-to-end behavior including:
//! - Workout catalog listing
//! - Driving a session from stdin to a stored record
//! - Suspend and resume
//! - Progress and CSV export over stored records

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from any real user config
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fitflex"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

const FULL_BODY_RUN: &str = "start\ndone 1\ndone 2\ntick 90\nnext\nnext\nfinish\n";

fn read_records(data_dir: &Path) -> Vec<Value> {
    let content =
        fs::read_to_string(data_dir.join("wal/sessions.jsonl")).expect("Failed to read records");
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid record line"))
        .collect()
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout session tracker"));
}

#[test]
fn test_workouts_lists_catalog() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("workouts")
        .assert()
        .success()
        .stdout(predicate::str::contains("full_body_blast"))
        .stdout(predicate::str::contains("Full Body Blast"))
        .stdout(predicate::str::contains("Yoga Flow"));
}

#[test]
fn test_workouts_filter_by_difficulty() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["workouts", "--difficulty", "beginner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Beginner"))
        .stdout(predicate::str::contains("Full Body Blast").not());
}

#[test]
fn test_invalid_difficulty_falls_back() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["workouts", "--difficulty", "legendary"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown difficulty"))
        .stdout(predicate::str::contains("Full Body Blast"));
}

#[test]
fn test_full_session_records_to_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin(FULL_BODY_RUN)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout complete"))
        .stdout(predicate::str::contains("2/10 sets"));

    let records = read_records(data_dir);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record["workout_id"], "full_body_blast");
    assert_eq!(record["user_id"], "local");
    assert_eq!(record["duration_seconds"], 90);
    assert_eq!(record["total_volume"].as_f64(), Some(2700.0));
    assert_eq!(record["sets"].as_array().map(|s| s.len()), Some(10));

    // Finished sessions leave nothing to resume
    assert!(!data_dir.join("wal/active_session.json").exists());
}

#[test]
fn test_weight_adjustment_changes_volume() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin("start\n+w 1\nweight 1 10\ndone 1\n-w 1\nnext\nnext\nfinish\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Set 1: 150 × 10"))
        .stdout(predicate::str::contains("Set 1 is complete"));

    let records = read_records(data_dir);
    assert_eq!(records[0]["total_volume"].as_f64(), Some(1500.0));
}

#[test]
fn test_user_override_is_recorded() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["--user", "alice", "start", "yoga_flow", "--no-clock"])
        .write_stdin("start\nnext\nnext\nfinish\n")
        .assert()
        .success();

    let records = read_records(data_dir);
    assert_eq!(records[0]["user_id"], "alice");

    // Another user sees none of it
    cli(data_dir)
        .args(["--user", "bob", "progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts: 0"));
}

#[test]
fn test_finish_before_last_exercise_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin("start\nfinish\nabandon\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Invalid transition"))
        .stdout(predicate::str::contains("abandoned"));

    assert!(!data_dir.join("wal/sessions.jsonl").exists());
}

#[test]
fn test_out_of_range_set_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin("start\ndone 9\nabandon\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_unknown_command_keeps_session_alive() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin("jump\nhelp\nabandon\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown command"))
        .stdout(predicate::str::contains("next / prev"));
}

#[test]
fn test_unknown_workout_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "marathon", "--no-clock"])
        .assert()
        .failure();
}

#[test]
fn test_quit_suspends_and_resume_finishes() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin("start\ndone 1\ntick 5\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session suspended at 00:00:05"));

    assert!(data_dir.join("wal/active_session.json").exists());

    // Only one session in flight
    cli(data_dir)
        .args(["start", "yoga_flow", "--no-clock"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fitflex resume"));

    cli(data_dir)
        .args(["resume", "--no-clock"])
        .write_stdin("start\ntick 5\nnext\nnext\nfinish\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resuming Full Body Blast at 00:00:05"))
        .stdout(predicate::str::contains("Workout complete"));

    let records = read_records(data_dir);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["duration_seconds"], 10);
    assert_eq!(records[0]["total_volume"].as_f64(), Some(1350.0));
    assert!(!data_dir.join("wal/active_session.json").exists());
}

#[test]
fn test_eof_suspends_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "hiit_cardio_burn", "--no-clock"])
        .write_stdin("start\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session suspended"));

    assert!(data_dir.join("wal/active_session.json").exists());
}

#[test]
fn test_resume_without_snapshot() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["resume", "--no-clock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No suspended session found"));
}

#[test]
fn test_empty_progress() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts: 0"))
        .stdout(predicate::str::contains("Total weight lifted: 0"))
        .stdout(predicate::str::contains("Last 30 days: 0 workouts"));
}

#[test]
fn test_progress_with_huge_window() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin(FULL_BODY_RUN)
        .assert()
        .success();

    cli(data_dir)
        .args(["progress", "--days", "4294967295"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last 4294967295 days: 1 workouts"));

    let out = data_dir.join("trend.csv");
    cli(data_dir)
        .args(["export", "--trend", "--days", "4294967295", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 rows"));
}

#[test]
fn test_extreme_weight_keeps_record_readable() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin("start\nweight 1 1e308\nweight 1 1e308\nnext\nnext\nfinish\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Set 1 unchanged"));

    let records = read_records(data_dir);
    assert_eq!(records.len(), 1);
    assert!(records[0]["sets"][0]["target_weight"].is_f64());

    cli(data_dir)
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts: 1"));
}

#[test]
fn test_progress_after_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    for _ in 0..2 {
        cli(data_dir)
            .args(["start", "full_body_blast", "--no-clock"])
            .write_stdin(FULL_BODY_RUN)
            .assert()
            .success();
    }

    cli(data_dir)
        .args(["progress", "--days", "7", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts: 2"))
        .stdout(predicate::str::contains("Total weight lifted: 5400"))
        .stdout(predicate::str::contains("Last 7 days: 2 workouts"))
        .stdout(predicate::str::contains("2/10 sets completed"));
}

#[test]
fn test_export_sets_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let out = data_dir.join("export/sets.csv");

    cli(data_dir)
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin(FULL_BODY_RUN)
        .assert()
        .success();

    cli(data_dir)
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 10 rows"));

    let csv = fs::read_to_string(&out).expect("Failed to read export");
    let mut lines = csv.lines();
    assert!(lines
        .next()
        .is_some_and(|header| header.starts_with("record_id,workout_id,workout_title,started_at")));
    assert_eq!(lines.count(), 10);
    assert!(csv.contains("Barbell Bench Press"));
}

#[test]
fn test_export_trend_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let out = data_dir.join("trend.csv");

    cli(data_dir)
        .args(["start", "full_body_blast", "--no-clock"])
        .write_stdin(FULL_BODY_RUN)
        .assert()
        .success();

    cli(data_dir)
        .args(["export", "--trend", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 rows"));

    let csv = fs::read_to_string(&out).expect("Failed to read export");
    assert!(csv.starts_with("date,volume"));
    assert!(csv.contains(",2700"));
}
