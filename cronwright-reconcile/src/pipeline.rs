//! Reconcile entrypoint shared by `install`, `diff` and tests.
//!
//! generate → load → merge → write → summary. The store is read at most once
//! and written at most once per call; no step runs after a failed load.

use std::path::{Path, PathBuf};

use serde::Serialize;

use cronwright_core::{
    store::{self, Loaded, MalformedPolicy},
    Job, StoreDocument, StoreError,
};

use crate::catalog::{self, Profile};
use crate::error::ReconcileError;
use crate::merge::{merge, MergeOutcome};
use crate::writer;

/// Advisory attached to every run.
pub const MANUAL_EDIT_WARNING: &str = "The gateway owns ~/.openclaw/cron/jobs.json; manual edits are only safe while the gateway is stopped. Prefer `openclaw cron add/edit` for day-to-day changes.";

/// Caller-supplied configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Substituted into job instructions; blank falls back to the default label.
    pub agent_label: Option<String>,
    /// Overwrite managed entries and recover from an unreadable store.
    pub force: bool,
    pub profile: Profile,
    /// Compute the summary without backing up or writing anything.
    pub dry_run: bool,
}

/// Outcome of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub created: Vec<String>,
    pub replaced: Vec<String>,
    pub kept: Vec<String>,
    /// Job count after the merge.
    pub total: usize,
    /// The scheduler must be restarted to pick up the change.
    pub restart_required: bool,
    pub warnings: Vec<String>,
    /// Copy of an unreadable store taken before it was discarded.
    pub backup: Option<PathBuf>,
    pub dry_run: bool,
}

pub(crate) struct Plan {
    pub desired: Vec<Job>,
    pub outcome: MergeOutcome,
    pub backup: Option<PathBuf>,
}

impl Plan {
    pub fn summary(&self, dry_run: bool) -> ReconcileSummary {
        ReconcileSummary {
            created: self.outcome.created.clone(),
            replaced: self.outcome.replaced.clone(),
            kept: self.outcome.kept.clone(),
            total: self.outcome.document.jobs.len(),
            restart_required: self.outcome.changed(),
            warnings: vec![MANUAL_EDIT_WARNING.to_owned()],
            backup: self.backup.clone(),
            dry_run,
        }
    }
}

/// Generate, load and merge without writing.
///
/// With `destructive` the loader may create a backup of an unreadable store;
/// otherwise the store is only read.
pub(crate) fn plan(
    store_path: &Path,
    workspace: &Path,
    options: &ReconcileOptions,
    now_ms: i64,
    destructive: bool,
) -> Result<Plan, ReconcileError> {
    if !workspace.is_dir() {
        return Err(ReconcileError::WorkspaceNotFound {
            path: workspace.to_path_buf(),
        });
    }

    let desired = catalog::generate(
        options.profile,
        workspace,
        options.agent_label.as_deref(),
        now_ms,
    );

    let loaded = if destructive {
        let policy = if options.force {
            MalformedPolicy::Reset
        } else {
            MalformedPolicy::Abort
        };
        store::load(store_path, policy)?
    } else {
        load_read_only(store_path, options.force)?
    };

    if let Some(backup) = &loaded.backup {
        tracing::warn!(
            "discarded unreadable store {} (backup: {})",
            store_path.display(),
            backup.display()
        );
    }

    let outcome = merge(loaded.document, &desired, options.force);
    Ok(Plan {
        desired,
        outcome,
        backup: loaded.backup,
    })
}

fn load_read_only(path: &Path, force: bool) -> Result<Loaded, StoreError> {
    match store::read(path) {
        Ok(Some(document)) => Ok(Loaded {
            document,
            existed: true,
            backup: None,
        }),
        Ok(None) => Ok(Loaded {
            document: StoreDocument::default(),
            existed: false,
            backup: None,
        }),
        Err(StoreError::Parse { .. }) if force => Ok(Loaded {
            document: StoreDocument::default(),
            existed: true,
            backup: None,
        }),
        Err(e) => Err(e),
    }
}

/// Reconcile the `options.profile` catalogue into the store at `store_path`.
///
/// Fails without writing when the store is unreadable and `force` is off
/// (a backup of the unreadable file is left next to it). `now_ms` stamps
/// newly generated jobs.
pub fn reconcile(
    store_path: &Path,
    workspace: &Path,
    options: &ReconcileOptions,
    now_ms: i64,
) -> Result<ReconcileSummary, ReconcileError> {
    let plan = plan(store_path, workspace, options, now_ms, !options.dry_run)?;

    if options.dry_run {
        tracing::info!("[dry-run] would write: {}", store_path.display());
    } else {
        writer::write(
            store_path,
            &store::reference_path(workspace),
            &plan.outcome.document,
            &plan.desired,
        )?;
    }

    let summary = plan.summary(options.dry_run);
    tracing::info!(
        "reconciled profile {}: {} created, {} replaced, {} kept, {} total",
        options.profile,
        summary.created.len(),
        summary.replaced.len(),
        summary.kept.len(),
        summary.total
    );
    Ok(summary)
}
