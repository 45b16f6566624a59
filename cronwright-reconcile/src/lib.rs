//! # cronwright-reconcile
//!
//! Declarative reconciliation of generated scheduler jobs into the shared
//! job store.
//!
//! Call [`reconcile`] to merge a profile's catalogue into the store,
//! [`diff::preview`] to see what that would change, or [`health::inspect`] to
//! check which managed jobs are present.

pub mod catalog;
pub mod diff;
mod error;
pub mod health;
pub mod merge;
pub mod pipeline;
pub mod writer;

pub use catalog::{generate, Profile, DEFAULT_AGENT_LABEL};
pub use error::ReconcileError;
pub use merge::{merge, MergeOutcome};
pub use pipeline::{reconcile, ReconcileOptions, ReconcileSummary};
