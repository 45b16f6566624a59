//! Scheduler job store on disk.
//!
//! # Storage layout
//!
//! ```text
//! ~/.openclaw/
//!   cron/
//!     jobs.json                  (store: shared with the gateway daemon)
//!     jobs.json.bak-<millis>     (byte copy of an unreadable store)
//! <workspace>/
//!   openclaw-cron-jobs.json      (reference copy of the generated jobs)
//! ```
//!
//! # API pattern
//!
//! Every function takes an explicit path. [`default_store_path`] is the only
//! helper that looks at the environment and is meant for CLI callers; tests
//! use [`store_path_at`] with a `TempDir` home.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::error::{io_err, StoreError};
use crate::types::{Job, StoreDocument};

/// File name of the reference copy written into the workspace.
pub const REFERENCE_FILE: &str = "openclaw-cron-jobs.json";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.openclaw/cron/jobs.json`: pure, no I/O.
pub fn store_path_at(home: &Path) -> PathBuf {
    home.join(".openclaw").join("cron").join("jobs.json")
}

/// `store_path_at` rooted at `dirs::home_dir()`.
pub fn default_store_path() -> Result<PathBuf, StoreError> {
    let home = dirs::home_dir()
        .filter(|h| !h.as_os_str().is_empty())
        .ok_or(StoreError::HomeNotFound)?;
    Ok(store_path_at(&home))
}

/// `<workspace>/openclaw-cron-jobs.json`: pure, no I/O.
pub fn reference_path(workspace: &Path) -> PathBuf {
    workspace.join(REFERENCE_FILE)
}

/// `<store>.bak-<millis>`: pure, no I/O.
pub fn backup_path(path: &Path, millis: i64) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".bak-{millis}"));
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// 2. Read / load
// ---------------------------------------------------------------------------

/// What to do when the store exists but cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Back the file up and fail with [`StoreError::Malformed`].
    Abort,
    /// Back the file up and continue with an empty document.
    Reset,
}

/// Result of [`load`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub document: StoreDocument,
    /// The store file was present on disk.
    pub existed: bool,
    /// Set when an unreadable store was copied aside.
    pub backup: Option<PathBuf>,
}

/// Read the store without side effects.
///
/// Returns `Ok(None)` when the file does not exist and
/// [`StoreError::Parse`] when it is not a job-store document.
pub fn read(path: &Path) -> Result<Option<StoreDocument>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Load the store for reconciliation.
///
/// A missing file is the first-run case and yields an empty document. An
/// unreadable file is always copied to a `.bak-<millis>` sibling first and
/// is never modified; `policy` decides whether the run then aborts or
/// proceeds from an empty document.
pub fn load(path: &Path, policy: MalformedPolicy) -> Result<Loaded, StoreError> {
    match read(path) {
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
        Err(StoreError::Parse { path, source }) => {
            let backup = backup(&path)?;
            match policy {
                MalformedPolicy::Abort => Err(StoreError::Malformed {
                    path,
                    backup,
                    source,
                }),
                MalformedPolicy::Reset => Ok(Loaded {
                    document: StoreDocument::default(),
                    existed: true,
                    backup: Some(backup),
                }),
            }
        }
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// 3. Backup
// ---------------------------------------------------------------------------

/// Copy `path` byte-for-byte to a fresh `<file>.bak-<millis>` sibling.
///
/// The target is opened with create-new semantics; if a backup with the
/// current millisecond already exists the suffix is bumped until a free name
/// is found, so repeated calls never overwrite an earlier backup.
pub fn backup(path: &Path) -> Result<PathBuf, StoreError> {
    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let target = backup_path(path, millis);
        match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(mut file) => {
                io::Write::write_all(&mut file, &bytes).map_err(|e| io_err(&target, e))?;
                file.sync_all().map_err(|e| io_err(&target, e))?;
                return Ok(target);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => millis += 1,
            Err(e) => return Err(io_err(&target, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Exact text written for `value`: 2-space pretty JSON plus a trailing newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StoreError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Atomically save the store document.
///
/// Write flow: serialize → `<file>.tmp` sibling → copy permissions of the
/// existing file → `rename`. The `.tmp` lives next to the target so the
/// rename never crosses filesystems.
pub fn save(path: &Path, document: &StoreDocument) -> Result<(), StoreError> {
    write_atomic(path, &to_pretty_json(document)?)
}

/// Atomically write the generated job list to the workspace reference file.
pub fn write_reference(path: &Path, jobs: &[Job]) -> Result<(), StoreError> {
    write_atomic(path, &to_pretty_json(jobs)?)
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(&tmp, meta.permissions()).map_err(|e| io_err(&tmp, e))?;
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
