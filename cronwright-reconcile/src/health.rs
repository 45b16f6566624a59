//! Read-only inspection of the store against a profile's catalogue.
//!
//! Verdict precedence:
//! 1. `Missing` (no store, unreadable store, or no managed job present)
//! 2. `Warn` (some managed jobs present, some absent)
//! 3. `Ok`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use cronwright_core::{store, JobKey, StoreError};

use crate::catalog::{self, Profile};
use crate::ReconcileError;

/// What was found at the store path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum StoreState {
    Missing,
    Unreadable(String),
    Ok,
}

/// One catalogue job and how it appears in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedStatus {
    pub key: JobKey,
    pub name: String,
    pub present: bool,
    /// `None` when absent or when the entry has no boolean `enabled`.
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Ok,
    Warn,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    pub path: PathBuf,
    pub profile: Profile,
    pub state: StoreState,
    pub managed: Vec<ManagedStatus>,
    /// Entries not belonging to the profile (including keyless ones).
    pub unmanaged: usize,
    pub total: usize,
}

impl StoreHealth {
    pub fn present(&self) -> usize {
        self.managed.iter().filter(|m| m.present).count()
    }

    pub fn verdict(&self) -> Verdict {
        let present = self.present();
        if self.state != StoreState::Ok || present == 0 {
            Verdict::Missing
        } else if present < self.managed.len() {
            Verdict::Warn
        } else {
            Verdict::Ok
        }
    }
}

/// Inspect the store at `store_path` for `profile`'s jobs.
///
/// Parse failures are reported as [`StoreState::Unreadable`]; only other I/O
/// errors are returned as `Err`. Never writes or backs up.
pub fn inspect(store_path: &Path, profile: Profile) -> Result<StoreHealth, ReconcileError> {
    let (state, document) = match store::read(store_path) {
        Ok(Some(doc)) => (StoreState::Ok, Some(doc)),
        Ok(None) => (StoreState::Missing, None),
        Err(err @ StoreError::Parse { .. }) => (StoreState::Unreadable(err.to_string()), None),
        Err(err) => return Err(err.into()),
    };

    let managed: Vec<ManagedStatus> = catalog::managed_jobs(profile)
        .map(|(key, name)| {
            let entry = document.as_ref().and_then(|d| d.find(key.as_str()));
            ManagedStatus {
                present: entry.is_some(),
                enabled: entry.and_then(|e| e.enabled()),
                name: name.to_owned(),
                key,
            }
        })
        .collect();

    let managed_keys: HashSet<&str> = managed.iter().map(|m| m.key.as_str()).collect();
    let (unmanaged, total) = match &document {
        Some(doc) => (
            doc.jobs
                .iter()
                .filter(|e| e.key().map_or(true, |k| !managed_keys.contains(k)))
                .count(),
            doc.jobs.len(),
        ),
        None => (0, 0),
    };

    tracing::debug!(
        "inspected {} for profile {profile}: {} managed present, {unmanaged} unmanaged",
        store_path.display(),
        managed.iter().filter(|m| m.present).count()
    );

    Ok(StoreHealth {
        path: store_path.to_path_buf(),
        profile,
        state,
        managed,
        unmanaged,
        total,
    })
}
