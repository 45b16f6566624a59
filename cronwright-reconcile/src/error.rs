//! Error types for cronwright-reconcile.

use std::path::PathBuf;

use thiserror::Error;

use cronwright_core::StoreError;

/// All errors that can arise from a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A store error, passed through with its original message.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The workspace directory the reference file belongs in does not exist.
    #[error("workspace directory not found: {path}")]
    WorkspaceNotFound { path: PathBuf },
}
