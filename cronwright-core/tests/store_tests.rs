//! Job-store load, backup and atomic-write integration tests.
//! Layout: ~/.openclaw/cron/jobs.json

use std::fs;

use assert_fs::prelude::*;
use cronwright_core::{
    store::{self, MalformedPolicy},
    JobEntry, StoreDocument, StoreError,
};
use predicates::prelude::predicate;
use rstest::rstest;
use serde_json::json;

fn write_store(home: &assert_fs::TempDir, contents: &str) -> std::path::PathBuf {
    let file = home.child(".openclaw/cron/jobs.json");
    file.write_str(contents).expect("write store");
    file.path().to_path_buf()
}

fn backups_in(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut found: Vec<_> = fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with("jobs.json.bak-"))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    found
}

// ---------------------------------------------------------------------------
// 1. Malformed store
// ---------------------------------------------------------------------------

#[rstest]
#[case::truncated_array(r#"{"version": 1, "jobs": [}"#)]
#[case::not_json("this is not json")]
#[case::root_is_array(r#"[{"id": "a"}]"#)]
#[case::jobs_is_object(r#"{"version": 1, "jobs": {"id": "a"}}"#)]
#[case::empty_file("")]
fn abort_backs_up_and_leaves_original(#[case] contents: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = write_store(&home, contents);

    let err = store::load(&path, MalformedPolicy::Abort).unwrap_err();
    let StoreError::Malformed { backup, .. } = &err else {
        panic!("expected Malformed, got: {err}");
    };

    let msg = err.to_string();
    assert!(msg.contains(&path.display().to_string()), "must name the store: {msg}");
    assert!(msg.contains(&backup.display().to_string()), "must name the backup: {msg}");
    assert!(msg.contains("--force"), "must mention the override: {msg}");

    assert_eq!(fs::read_to_string(&path).unwrap(), contents, "original untouched");
    let backups = backups_in(path.parent().unwrap());
    assert_eq!(backups, vec![backup.clone()]);
    assert_eq!(fs::read_to_string(backup).unwrap(), contents);
}

#[test]
fn each_failed_attempt_gets_its_own_backup() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = write_store(&home, "{oops");

    for _ in 0..3 {
        store::load(&path, MalformedPolicy::Abort).unwrap_err();
    }
    assert_eq!(backups_in(path.parent().unwrap()).len(), 3);
}

#[test]
fn reset_backs_up_and_returns_empty_document() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = write_store(&home, "{oops");

    let loaded = store::load(&path, MalformedPolicy::Reset).expect("reset");
    assert_eq!(loaded.document, StoreDocument::default());
    assert!(loaded.existed);

    let backup = loaded.backup.expect("backup taken before discard");
    assert_eq!(fs::read_to_string(backup).unwrap(), "{oops");
    assert_eq!(fs::read_to_string(&path).unwrap(), "{oops", "load never writes the store");
}

#[test]
fn read_reports_parse_error_without_backup() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = write_store(&home, "{oops");

    let err = store::read(&path).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
    assert!(backups_in(path.parent().unwrap()).is_empty());
}

// ---------------------------------------------------------------------------
// 2. Well-formed store
// ---------------------------------------------------------------------------

#[test]
fn load_preserves_entries_verbatim() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = write_store(
        &home,
        r#"{"version": 2, "jobs": [{"id": "u", "custom": {"z": 1, "a": 2}}, 17, null]}"#,
    );

    let loaded = store::load(&path, MalformedPolicy::Abort).expect("load");
    assert!(loaded.existed);
    assert_eq!(loaded.document.version, 2);
    assert_eq!(
        loaded.document.jobs,
        vec![
            JobEntry(json!({"id": "u", "custom": {"z": 1, "a": 2}})),
            JobEntry(json!(17)),
            JobEntry(json!(null)),
        ]
    );
}

#[test]
fn save_then_load_keeps_key_order() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = store::store_path_at(home.path());
    let text = "{\n  \"version\": 1,\n  \"jobs\": [\n    {\n      \"zeta\": 1,\n      \"id\": \"u\",\n      \"alpha\": 2\n    }\n  ]\n}\n";
    write_store(&home, text);

    let loaded = store::load(&path, MalformedPolicy::Abort).expect("load");
    store::save(&path, &loaded.document).expect("save");
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn reference_file_is_written_into_workspace() {
    let workspace = assert_fs::TempDir::new().expect("tempdir");
    let path = store::reference_path(workspace.path());
    store::write_reference(&path, &[]).expect("write reference");

    workspace
        .child("openclaw-cron-jobs.json")
        .assert(predicate::str::contains("[]"));
}

#[test]
fn mid_write_crash_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = store::store_path_at(home.path());
    store::save(&path, &StoreDocument::default()).expect("save");
    let original = fs::read(&path).unwrap();

    // Simulate crash: .tmp written but process died before rename
    let tmp = path.with_file_name("jobs.json.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").unwrap();

    assert_eq!(fs::read(&path).unwrap(), original);
    let loaded = store::load(&path, MalformedPolicy::Abort).expect("still loadable");
    assert_eq!(loaded.document, StoreDocument::default());
}
