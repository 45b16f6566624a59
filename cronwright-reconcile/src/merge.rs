//! Merge engine: folds the desired job list into an existing store document.
//!
//! ## Rules
//!
//! 1. Desired jobs are indexed by key; each key is consumed at most once.
//! 2. Existing entries are walked in order:
//!    - no usable key, or key not desired → passed through untouched;
//!    - key desired, `force == false` → existing entry kept as-is;
//!    - key desired, `force == true` → replaced by the desired job in place.
//! 3. Desired jobs not consumed by the walk are appended in desired order.
//! 4. `version` and any extra top-level fields carry over.
//!
//! Entries this tool does not manage are never reordered, edited or dropped.

use std::collections::{HashMap, HashSet};

use cronwright_core::{Job, StoreDocument};

/// Result of [`merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub document: StoreDocument,
    /// Names of desired jobs appended because their key was absent.
    pub created: Vec<String>,
    /// Names of desired jobs that overwrote an existing entry (`force`).
    pub replaced: Vec<String>,
    /// Names of managed entries left as they were (no `force`).
    pub kept: Vec<String>,
}

impl MergeOutcome {
    /// The merged document differs from the input in managed content.
    pub fn changed(&self) -> bool {
        !self.created.is_empty() || !self.replaced.is_empty()
    }
}

/// Merge `desired` into `existing`. Infallible and free of I/O.
///
/// Only the first store entry per managed key is kept or replaced; later
/// entries sharing that key stay in place, even under `force`.
pub fn merge(existing: StoreDocument, desired: &[Job], force: bool) -> MergeOutcome {
    let mut by_key: HashMap<&str, &Job> = HashMap::with_capacity(desired.len());
    for job in desired {
        let key = job.key.as_str();
        if key.is_empty() {
            tracing::debug!("skipping desired job '{}' without a key", job.name);
            continue;
        }
        by_key.entry(key).or_insert(job);
    }

    let StoreDocument {
        version,
        jobs: existing_jobs,
        extra,
    } = existing;

    let mut consumed: HashSet<&str> = HashSet::with_capacity(by_key.len());
    let mut jobs = Vec::with_capacity(existing_jobs.len() + by_key.len());
    let mut created = Vec::new();
    let mut replaced = Vec::new();
    let mut kept = Vec::new();

    for entry in existing_jobs {
        let Some(job) = entry.key().and_then(|key| by_key.get(key).copied()) else {
            jobs.push(entry);
            continue;
        };

        let key = job.key.as_str();
        if !consumed.insert(key) {
            // A second store entry with an already-consumed key is not ours
            // to collapse; leave it where it is.
            tracing::warn!("duplicate store entry for managed key {key}; leaving it untouched");
            jobs.push(entry);
            continue;
        }

        if force {
            tracing::debug!("replacing managed job {key}");
            replaced.push(job.display_name().to_owned());
            jobs.push(job.to_entry());
        } else {
            tracing::debug!("keeping existing managed job {key}");
            kept.push(entry.name().filter(|n| !n.is_empty()).unwrap_or(key).to_owned());
            jobs.push(entry);
        }
    }

    for job in desired {
        let key = job.key.as_str();
        if key.is_empty() || consumed.contains(key) {
            continue;
        }
        consumed.insert(key);
        tracing::debug!("creating managed job {key}");
        created.push(job.display_name().to_owned());
        jobs.push(job.to_entry());
    }

    MergeOutcome {
        document: StoreDocument {
            version,
            jobs,
            extra,
        },
        created,
        replaced,
        kept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cronwright_core::{JobEntry, JobKey, Payload, Schedule, SessionTarget, WakeMode};
    use serde_json::json;

    fn job(key: &str, name: &str, enabled: bool) -> Job {
        Job {
            key: JobKey::from(key),
            name: name.to_owned(),
            enabled,
            delete_after_run: false,
            created_at_ms: 10,
            updated_at_ms: 10,
            schedule: Schedule::cron("* * * * *"),
            session_target: SessionTarget::Main,
            wake_mode: WakeMode::NextHeartbeat,
            payload: Payload::SystemEvent {
                command: "true".to_owned(),
            },
            isolation: None,
        }
    }

    fn doc(jobs: Vec<serde_json::Value>) -> StoreDocument {
        StoreDocument {
            jobs: jobs.into_iter().map(JobEntry).collect(),
            ..StoreDocument::default()
        }
    }

    #[test]
    fn without_force_existing_managed_entry_wins() {
        let existing = doc(vec![
            json!({"id": "unmanaged-1", "name": "User Job", "enabled": true}),
            json!({"jobId": "managed-1", "name": "Managed Job (old)", "enabled": false}),
        ]);
        let desired = [job("managed-1", "Managed Job (new)", true)];

        let out = merge(existing.clone(), &desired, false);
        assert_eq!(out.document.jobs, existing.jobs);
        assert!(out.created.is_empty());
        assert!(out.replaced.is_empty());
        assert_eq!(out.kept, ["Managed Job (old)"]);
        assert!(!out.changed());
    }

    #[test]
    fn force_replaces_in_place_with_normalized_ids() {
        let existing = doc(vec![
            json!({"jobId": "managed-1", "name": "Managed Job (old)", "enabled": false}),
        ]);
        let desired = [job("managed-1", "Managed Job (new)", true)];

        let out = merge(existing, &desired, true);
        assert_eq!(out.document.jobs, vec![desired[0].to_entry()]);
        assert_eq!(out.document.jobs[0].0["id"], "managed-1");
        assert_eq!(out.document.jobs[0].0["jobId"], "managed-1");
        assert!(out.created.is_empty());
        assert_eq!(out.replaced, ["Managed Job (new)"]);
        assert!(out.changed());
    }

    #[test]
    fn missing_desired_jobs_are_appended_in_order() {
        let existing = doc(vec![json!({"id": "unmanaged-1", "name": "User Job"})]);
        let desired = [
            job("managed-1", "Managed One", true),
            job("managed-2", "Managed Two", true),
        ];

        let out = merge(existing, &desired, false);
        assert_eq!(
            out.document.keys().collect::<Vec<_>>(),
            ["unmanaged-1", "managed-1", "managed-2"]
        );
        assert_eq!(out.created, ["Managed One", "Managed Two"]);
        assert!(out.replaced.is_empty());
    }

    #[test]
    fn keyless_and_non_object_entries_pass_through() {
        let existing = doc(vec![
            json!({"name": "no key"}),
            json!(42),
            json!({"id": ""}),
            json!({"jobId": "managed-1", "name": "old"}),
        ]);
        let desired = [job("managed-1", "new", true)];

        let out = merge(existing.clone(), &desired, true);
        assert_eq!(out.document.jobs[..3], existing.jobs[..3]);
        assert_eq!(out.document.jobs[3], desired[0].to_entry());
    }

    #[test]
    fn replaced_entry_keeps_its_position() {
        let existing = doc(vec![
            json!({"id": "a"}),
            json!({"id": "managed-1"}),
            json!({"id": "b"}),
        ]);
        let desired = [job("managed-1", "M", true), job("managed-2", "N", true)];

        let out = merge(existing, &desired, true);
        assert_eq!(
            out.document.keys().collect::<Vec<_>>(),
            ["a", "managed-1", "b", "managed-2"]
        );
        assert_eq!(out.replaced, ["M"]);
        assert_eq!(out.created, ["N"]);
    }

    #[test]
    fn desired_key_matched_through_legacy_id() {
        let existing = doc(vec![json!({"id": "managed-1", "name": "legacy"})]);
        let out = merge(existing, &[job("managed-1", "M", true)], false);
        assert_eq!(out.document.jobs.len(), 1);
        assert_eq!(out.kept, ["legacy"]);
    }

    #[test]
    fn duplicate_desired_keys_consumed_once() {
        let desired = [job("k", "first", true), job("k", "second", true)];
        let out = merge(StoreDocument::default(), &desired, false);
        assert_eq!(out.document.jobs.len(), 1);
        assert_eq!(out.created, ["first"]);
    }

    #[test]
    fn duplicate_existing_managed_entries_replaced_once() {
        let existing = doc(vec![
            json!({"id": "k", "name": "one"}),
            json!({"id": "k", "name": "two"}),
        ]);
        let out = merge(existing.clone(), &[job("k", "new", true)], true);
        assert_eq!(out.replaced, ["new"]);
        assert_eq!(out.document.jobs[0].name(), Some("new"));
        assert_eq!(out.document.jobs[1], existing.jobs[1]);
    }

    #[test]
    fn empty_desired_key_is_skipped() {
        let out = merge(StoreDocument::default(), &[job("", "ghost", true)], false);
        assert!(out.document.jobs.is_empty());
        assert!(out.created.is_empty());
    }

    #[test]
    fn blank_name_reported_by_key() {
        let out = merge(StoreDocument::default(), &[job("k-1", " ", true)], false);
        assert_eq!(out.created, ["k-1"]);
    }

    #[test]
    fn version_and_extra_fields_carry_over() {
        let mut existing = doc(vec![]);
        existing.version = 7;
        existing
            .extra
            .insert("owner".to_owned(), json!("gateway"));
        let out = merge(existing, &[job("k", "K", true)], false);
        assert_eq!(out.document.version, 7);
        assert_eq!(out.document.extra["owner"], "gateway");
    }

    #[test]
    fn negative_version_survives_merge() {
        let existing: StoreDocument =
            serde_json::from_str(r#"{"version": -3, "jobs": []}"#).unwrap();
        let out = merge(existing, &[], false);
        assert_eq!(out.document.version, -3);
    }
}
