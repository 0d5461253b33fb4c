// CLI behaviour against a throwaway working directory

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;

fn studio_flow(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("studio-flow").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn write_dataset(path: &Path) {
    let dataset = serde_json::json!({
        "entities": [
            {
                "kind": "booking",
                "id": "bk-1",
                "client_id": "cl-1",
                "photographer_id": "ph-1",
                "scheduled_at": "2099-06-01T10:00:00Z",
                "total_cents": 45000,
                "status": "Pending"
            },
            {
                "kind": "booking",
                "id": "bk-2",
                "client_id": "cl-2",
                "photographer_id": "ph-1",
                "scheduled_at": "2099-06-01T11:00:00Z",
                "total_cents": 30000,
                "status": "Confirmed"
            },
            {
                "kind": "booking",
                "id": "bk-3",
                "client_id": "cl-3",
                "photographer_id": "ph-2",
                "scheduled_at": "2099-07-01T10:00:00Z",
                "total_cents": 30000,
                "status": "Cancelled"
            }
        ]
    });
    std::fs::write(path, serde_json::to_string_pretty(&dataset).unwrap()).unwrap();
}

#[test]
fn no_subcommand_shows_usage_guidance() {
    let dir = tempfile::tempdir().unwrap();
    studio_flow(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("studio-flow transitions"));
}

#[test]
fn transitions_lists_targets_with_guards() {
    let dir = tempfile::tempdir().unwrap();
    studio_flow(dir.path())
        .args(["transitions", "booking", "Pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Confirmed"))
        .stdout(predicate::str::contains("no_photographer_conflict"))
        .stdout(predicate::str::contains("Cancelled"));
}

#[test]
fn check_exit_code_follows_legality() {
    let dir = tempfile::tempdir().unwrap();
    studio_flow(dir.path())
        .args(["check", "invoice", "Draft", "Sent"])
        .assert()
        .success();

    studio_flow(dir.path())
        .args(["check", "booking", "Cancelled", "Confirmed"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid transition from Cancelled to Confirmed"));
}

#[test]
fn statuses_prints_editing_labels() {
    let dir = tempfile::tempdir().unwrap();
    studio_flow(dir.path())
        .args(["statuses", "--kind", "editing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Revisions Needed"))
        .stdout(predicate::str::contains("Client Review"));
}

#[test]
fn transition_reports_validation_failure_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("studio.json");
    write_dataset(&data);

    let output = studio_flow(dir.path())
        .args(["transition", "--data", "studio.json", "--kind", "booking", "--id", "bk-1", "--to", "Confirmed"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let result: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["success"], Value::Bool(false));
    assert_eq!(result["error"], "Validation failed for this transition");
    assert_eq!(result["failure"], "validation_declined");

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&data).unwrap()).unwrap();
    assert!(saved["history"].as_array().map_or(true, |h| h.is_empty()));
}

#[test]
fn transition_saves_committed_status() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("studio.json");
    write_dataset(&data);

    studio_flow(dir.path())
        .args(["transition", "--data", "studio.json", "--kind", "booking", "--id", "bk-2", "--to", "cancelled"])
        .args(["--note", "client rescheduled"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&data).unwrap()).unwrap();
    let bk2 = saved["entities"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "bk-2")
        .unwrap();
    assert_eq!(bk2["status"], "Cancelled");
    assert_eq!(saved["history"][0]["note"], "client rescheduled");
}

#[test]
fn init_config_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    studio_flow(dir.path()).arg("init-config").assert().success();
    assert!(dir.path().join("studio-flow.toml").exists());

    studio_flow(dir.path())
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}
