//! Store writer: persists a merged document and the reference copy.

use std::path::Path;

use cronwright_core::{store, Job, StoreDocument};

use crate::error::ReconcileError;

/// Save `document` to the store, then write the raw `desired` list to the
/// workspace reference file.
///
/// The reference copy is for humans only; nothing reads it back. Errors are
/// returned as-is; there is no retry.
pub fn write(
    store_path: &Path,
    reference_path: &Path,
    document: &StoreDocument,
    desired: &[Job],
) -> Result<(), ReconcileError> {
    store::save(store_path, document)?;
    tracing::info!(
        "wrote {} ({} jobs)",
        store_path.display(),
        document.jobs.len()
    );

    store::write_reference(reference_path, desired)?;
    tracing::info!("wrote reference {}", reference_path.display());
    Ok(())
}
