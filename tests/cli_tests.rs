#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn run_cli(data_file: &Path, script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.arg("--data-file")
        .arg(data_file)
        .arg("--today")
        .arg("2024-03-25")
        .env_remove("MAINTENANCE_TRACKER_DATA")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_bootstraps_missing_data_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("items.csv");
    run_cli(&path, "list\n")
        .success()
        .stdout(str_contains("Loaded 0 items"))
        .stdout(str_contains("(no items)"));
    assert!(path.exists());
}

#[test]
fn cli_add_then_quit_saves_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    run_cli(&path, "add 2024-01-01 90 Oil Change\nlist\nquit\n")
        .success()
        .stdout(str_contains("Added: Oil Change"))
        .stdout(str_contains("next: 2024-03-31 (in 6 days) [DUE_SOON]"))
        .stdout(str_contains("Saved 1 items to"))
        .stdout(str_contains("Goodbye."));

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.ends_with(",Oil Change,2024-01-01,90\n"), "{contents}");
}

#[test]
fn cli_rejects_invalid_input() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    run_cli(&path, "add 2024-13-01 90 Bad\nadd 2024-01-01 ninety Bad\nadd 2024-01-01 90\nlist\n")
        .success()
        .stdout(str_contains("invalid date '2024-13-01'"))
        .stdout(str_contains("invalid interval 'ninety'"))
        .stdout(str_contains("name cannot be empty"))
        .stdout(str_contains("(no items)"));
}

#[test]
fn cli_eof_exits_without_saving() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    run_cli(&path, "add 2024-01-01 90 Oil Change\n").success();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
#[allow(deprecated)]
fn cli_reports_unreadable_input_before_exiting() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    let mut script = b"add 2024-01-01 90 Oil Change\n".to_vec();
    script.extend_from_slice(b"list \xff\xfe\n");
    Command::cargo_bin("cli")
        .expect("cli binary")
        .arg("--data-file")
        .arg(&path)
        .arg("--today")
        .arg("2024-03-25")
        .env_remove("MAINTENANCE_TRACKER_DATA")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(str_contains("Added: Oil Change"))
        .stdout(str_contains("Failed to read input:"))
        .stdout(str_contains("Exiting without saving."));
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn cli_alerts_report_overdue_and_due_soon() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    fs::write(
        &path,
        "1,Oil Change,2024-01-01,90\n2,Brakes,2024-01-01,80\n3,Tyres,2024-03-01,365\n",
    )
    .unwrap();
    run_cli(&path, "alerts\n")
        .success()
        .stdout(str_contains("Brakes -> next: 2024-03-21 -> OVERDUE by 4 days"))
        .stdout(str_contains("Oil Change -> next: 2024-03-31 -> due in 6 days"))
        .stdout(str_contains("Overdue: 1, Due soon: 1, Total: 3"));
}

#[test]
fn cli_alerts_when_nothing_is_due() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    fs::write(&path, "3,Tyres,2024-03-01,365\n").unwrap();
    run_cli(&path, "alerts\n")
        .success()
        .stdout(str_contains("No upcoming or overdue maintenance."));
}

#[test]
fn cli_reports_malformed_lines_and_keeps_the_rest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    fs::write(&path, "oops\n1,Oil Change,2024-01-01,90\n").unwrap();
    run_cli(&path, "list\n")
        .success()
        .stdout(str_contains("Skipping malformed line 1: oops"))
        .stdout(str_contains("Loaded 1 items"));
}

#[test]
fn cli_edits_existing_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    fs::write(&path, "1,Oil Change,2024-01-01,90\n2,Brakes,2024-01-01,80\n").unwrap();
    run_cli(
        &path,
        "serviced 1 2024-03-20\nrename 2 Rear brakes\ninterval 2 120\ndelete 9\nsave\n",
    )
    .success()
    .stdout(str_contains("Updated: Oil Change (id=1) - last: 2024-03-20, interval: 90 days"))
    .stdout(str_contains("Updated: Rear brakes (id=2)"))
    .stdout(str_contains("no record with id '9'"));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "1,Oil Change,2024-03-20,90\n2,Rear brakes,2024-01-01,120\n"
    );
}

#[test]
fn cli_delete_then_save_drops_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    fs::write(&path, "1,Oil Change,2024-01-01,90\n2,Brakes,2024-01-01,80\n").unwrap();
    run_cli(&path, "delete 1\nsave\n")
        .success()
        .stdout(str_contains("Deleted: Oil Change"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "2,Brakes,2024-01-01,80\n");
}

#[test]
fn cli_exports_json_and_report() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.csv");
    let json_path = dir.path().join("snapshot.json");
    let report_path = dir.path().join("report.csv");
    fs::write(&path, "1,Oil Change,2024-01-01,90\n").unwrap();
    let script = format!(
        "export json {}\nexport report {}\n",
        json_path.display(),
        report_path.display()
    );
    run_cli(&path, &script)
        .success()
        .stdout(str_contains("Exported 1 items"));

    assert!(fs::read_to_string(&json_path).unwrap().contains("\"Oil Change\""));
    assert!(
        fs::read_to_string(&report_path)
            .unwrap()
            .contains("1,Oil Change,2024-01-01,90,2024-03-31,6,DUE_SOON")
    );
}
