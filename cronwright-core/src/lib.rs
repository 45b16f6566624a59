//! cronwright core library: job-store domain types, persistence, errors.
//!
//! - [`types`]: [`Job`], [`JobEntry`], [`StoreDocument`] and friends
//! - [`error`]: [`StoreError`]
//! - [`store`]: paths, read / load (with backup), atomic save

pub mod error;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{Loaded, MalformedPolicy};
pub use types::{
    Isolation, Job, JobEntry, JobKey, Payload, PostMode, Schedule, SessionTarget, StoreDocument,
    WakeMode,
};
