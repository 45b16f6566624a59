//! Preview support for `cronwright diff`.

use std::io::ErrorKind;
use std::path::Path;

use similar::TextDiff;

use cronwright_core::{error::io_err, store};

use crate::pipeline::{plan, ReconcileOptions, ReconcileSummary};
use crate::ReconcileError;

/// What a reconcile run would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub summary: ReconcileSummary,
    /// Unified diff of the store file; empty when nothing would change.
    pub unified_diff: String,
}

/// Render what [`crate::reconcile`] would write and diff it against the
/// current store text.
///
/// Never writes and never backs up. An unreadable store fails unless
/// `options.force` is set, in which case it diffs against the full
/// replacement.
pub fn preview(
    store_path: &Path,
    workspace: &Path,
    options: &ReconcileOptions,
    now_ms: i64,
) -> Result<Preview, ReconcileError> {
    let plan = plan(store_path, workspace, options, now_ms, false)?;
    let rendered = store::to_pretty_json(&plan.outcome.document)?;
    let existing = read_existing_or_empty(store_path)?;

    let unified_diff = if existing == rendered {
        String::new()
    } else {
        TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header("a/jobs.json", "b/jobs.json")
            .context_radius(3)
            .to_string()
    };

    Ok(Preview {
        summary: plan.summary(true),
        unified_diff,
    })
}

fn read_existing_or_empty(path: &Path) -> Result<String, ReconcileError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(normalize_line_endings(&String::from_utf8_lossy(&bytes))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err).into()),
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
