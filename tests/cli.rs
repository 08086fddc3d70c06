#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(clinic: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nobet-cli").unwrap();
    cmd.arg("--clinic").arg(clinic);
    cmd
}

#[test]
fn auto_assign_status_reset_cycle() {
    let dir = tempdir().unwrap();
    let clinic = dir.path().join("clinic.json");
    let doctors = dir.path().join("doctors.csv");
    fs::write(&doctors, "handle,display_name,quota,locations\na,A,15,cardio\nb,B,15,cardio\n").unwrap();

    cli(&clinic)
        .args(["import-doctors", "--csv"])
        .arg(&doctors)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 doctor(s) imported"));

    let month = ["--location", "cardio", "--year", "2025", "--month", "2"];

    cli(&clinic)
        .arg("auto-assign")
        .args(month)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("cardio: 28 shift(s) assigned"));

    cli(&clinic)
        .arg("status")
        .args(month)
        .assert()
        .success()
        .stdout(predicate::str::contains("cardio 2025-02: done"));

    cli(&clinic)
        .arg("auto-assign")
        .args(month)
        .assert()
        .failure()
        .stderr(predicate::str::contains("month already processed"));

    cli(&clinic)
        .arg("reset")
        .args(month)
        .assert()
        .success()
        .stdout(predicate::str::contains("28 shift(s) deleted"));

    cli(&clinic)
        .arg("status")
        .args(month)
        .assert()
        .success()
        .stdout(predicate::str::contains("not started"));
}

#[test]
fn auto_assign_reports_unstaffed_days_with_code_2() {
    let dir = tempdir().unwrap();
    let clinic = dir.path().join("clinic.json");
    let doctors = dir.path().join("doctors.csv");
    let unstaffed = dir.path().join("unstaffed.csv");
    fs::write(&doctors, "handle,display_name,quota,locations\na,A,27,cardio\n").unwrap();

    cli(&clinic)
        .args(["import-doctors", "--csv"])
        .arg(&doctors)
        .assert()
        .success();

    cli(&clinic)
        .args(["auto-assign", "--location", "cardio", "--year", "2025", "--month", "2"])
        .arg("--unstaffed-csv")
        .arg(&unstaffed)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("2025-02-28"));

    let text = fs::read_to_string(&unstaffed).unwrap();
    assert_eq!(text, "location,date\ncardio,2025-02-28\n");
}

#[test]
fn unknown_location_fails() {
    let dir = tempdir().unwrap();
    cli(&dir.path().join("clinic.json"))
        .args(["status", "--location", "nowhere", "--year", "2025", "--month", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown location: nowhere"));
}
