//! Error types for cronwright-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from job-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure, annotated with the path being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store exists but is not a readable job-store document.
    ///
    /// Produced by the non-destructive [`crate::store::read`]; nothing on
    /// disk has been touched.
    #[error(
        "failed to parse job store at {path}: {source}. \
         Fix the JSON and re-run, or re-run with --force to overwrite."
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The store was unreadable; a backup was taken and the run aborted.
    #[error(
        "failed to parse job store at {path}: {source}. Backed up to: {backup}. \
         Fix the JSON and re-run, or re-run with --force to overwrite."
    )]
    Malformed {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.openclaw/`.
    #[error("cannot determine home directory; set $HOME to locate ~/.openclaw/cron/jobs.json")]
    HomeNotFound,
}

/// Convenience constructor for [`StoreError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
