use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn cronwright_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cronwright"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

fn store_file(home: &TempDir) -> PathBuf {
    home.path().join(".openclaw").join("cron").join("jobs.json")
}

fn install(home: &TempDir, workspace: &TempDir, profile: &str) {
    cronwright_cmd(home.path())
        .args(["install", "--profile", profile, "--workspace"])
        .arg(workspace.path())
        .assert()
        .success();
}

#[test]
fn status_json_reports_managed_jobs() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    install(&home, &workspace, "trader");

    let assert = cronwright_cmd(home.path())
        .args(["status", "--profile", "trader", "--json"])
        .assert()
        .success();
    let payload: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("status json");

    assert_eq!(payload["state"]["state"], "ok");
    assert_eq!(payload["profile"], "trader");
    assert_eq!(payload["total"], 7);
    let managed = payload["managed"].as_array().expect("managed array");
    assert_eq!(managed.len(), 7);
    assert!(managed.iter().all(|m| m["present"] == true));
}

#[test]
fn status_table_flags_missing_profile() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    install(&home, &workspace, "core");

    cronwright_cmd(home.path())
        .args(["status", "--profile", "trader"])
        .assert()
        .success()
        .stdout(contains("0/7 managed jobs present"))
        .stdout(contains("MISSING"))
        .stdout(contains("cronwright install --profile trader"));
}

#[test]
fn status_on_missing_store() {
    let home = TempDir::new().expect("home");
    cronwright_cmd(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Store not found"));
}

#[test]
fn status_never_backs_up_unreadable_store() {
    let home = TempDir::new().expect("home");
    let path = store_file(&home);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{").unwrap();

    cronwright_cmd(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("failed to parse job store"));
    assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
}

#[test]
fn diff_shows_added_jobs_then_nothing() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let path = store_file(&home);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let seeded = serde_json::json!({
        "version": 1,
        "jobs": [{"id": "unmanaged-1", "name": "User Job"}]
    });
    fs::write(
        &path,
        format!("{}\n", serde_json::to_string_pretty(&seeded).unwrap()),
    )
    .unwrap();

    let assert = cronwright_cmd(home.path())
        .args(["diff", "--workspace"])
        .arg(workspace.path())
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout
        .lines()
        .any(|l| l.starts_with('+') && l.contains("Weekly Synthesis")));
    assert!(!stdout
        .lines()
        .any(|l| l.starts_with('-') && l.contains("unmanaged-1")));

    install(&home, &workspace, "core");
    cronwright_cmd(home.path())
        .args(["diff", "--workspace"])
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(contains("No changes"));
}
