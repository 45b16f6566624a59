//! Domain types for the scheduler job store.
//!
//! Two views of a job exist:
//! - [`Job`]: a fully typed definition produced by this tool. It carries a
//!   single [`JobKey`]; the dual `jobId`/`id` naming only appears when it is
//!   serialized (see [`Job::to_entry`]).
//! - [`JobEntry`]: whatever sits in the persisted store. It is kept as raw
//!   JSON so that entries owned by humans or other tools survive a rewrite
//!   untouched, whatever their shape.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identity of a job across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey(pub String);

impl JobKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for JobKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Job metadata
// ---------------------------------------------------------------------------

/// When a job fires. Opaque to the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Schedule {
    Cron { expr: String },
}

impl Schedule {
    pub fn cron(expr: impl Into<String>) -> Self {
        Schedule::Cron { expr: expr.into() }
    }
}

/// What a job does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Payload {
    /// Lightweight: the scheduler runs a command directly.
    SystemEvent { command: String },
    /// Conversational: the scheduler opens an agent session with an instruction.
    AgentTurn { message: String },
}

impl Payload {
    /// The free-text part of the payload (command line or instruction).
    pub fn text(&self) -> &str {
        match self {
            Payload::SystemEvent { command } => command,
            Payload::AgentTurn { message } => message,
        }
    }
}

/// Which session a job runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionTarget {
    #[default]
    Main,
    Isolated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WakeMode {
    #[default]
    NextHeartbeat,
    Now,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostMode {
    #[default]
    Summary,
    Full,
}

/// How an isolated run reports back to the main session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Isolation {
    pub post_to_main_prefix: String,
    pub post_to_main_mode: PostMode,
    pub post_to_main_max_chars: u32,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A job definition generated by this tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub key: JobKey,
    pub name: String,
    pub enabled: bool,
    pub delete_after_run: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub schedule: Schedule,
    pub session_target: SessionTarget,
    pub wake_mode: WakeMode,
    pub payload: Payload,
    pub isolation: Option<Isolation>,
}

impl Job {
    /// Name used in reports; falls back to the key when the name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.key.as_str()
        } else {
            &self.name
        }
    }

    /// Serialize into a store entry, writing the key under both `jobId`
    /// and `id`.
    pub fn to_entry(&self) -> JobEntry {
        let mut value = json!({
            "jobId": self.key,
            "id": self.key,
            "name": self.name,
            "enabled": self.enabled,
            "deleteAfterRun": self.delete_after_run,
            "createdAtMs": self.created_at_ms,
            "updatedAtMs": self.updated_at_ms,
            "schedule": self.schedule,
            "sessionTarget": self.session_target,
            "wakeMode": self.wake_mode,
            "payload": self.payload,
        });
        if let (Some(isolation), Some(obj)) = (&self.isolation, value.as_object_mut()) {
            obj.insert("isolation".to_owned(), json!(isolation));
        }
        JobEntry(value)
    }
}

impl Serialize for Job {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_entry().serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Persisted entries
// ---------------------------------------------------------------------------

/// One entry of the persisted `jobs` array, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobEntry(pub Value);

impl JobEntry {
    /// Identity of the entry: `jobId` if it is a string, else `id`.
    ///
    /// Returns `None` for non-objects, entries without either field, and
    /// empty keys.
    pub fn key(&self) -> Option<&str> {
        let obj = self.0.as_object()?;
        let key = obj
            .get("jobId")
            .and_then(Value::as_str)
            .or_else(|| obj.get("id").and_then(Value::as_str))?;
        (!key.is_empty()).then_some(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// `enabled` flag; absent or non-boolean reads as `None`.
    pub fn enabled(&self) -> Option<bool> {
        self.0.get("enabled").and_then(Value::as_bool)
    }
}

impl From<Value> for JobEntry {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&Job> for JobEntry {
    fn from(job: &Job) -> Self {
        job.to_entry()
    }
}

// ---------------------------------------------------------------------------
// Store document
// ---------------------------------------------------------------------------

/// Default (and fallback) store format version.
pub const DEFAULT_VERSION: i64 = 1;

/// Root of `jobs.json`.
///
/// Top-level fields other than `version` and `jobs` are carried in `extra`
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct StoreDocument {
    pub version: i64,
    pub jobs: Vec<JobEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            jobs: vec![],
            extra: Map::new(),
        }
    }
}

impl StoreDocument {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().filter_map(JobEntry::key)
    }

    pub fn find(&self, key: &str) -> Option<&JobEntry> {
        self.jobs.iter().find(|entry| entry.key() == Some(key))
    }
}

/// Lenient load shape: `version` may be anything, `jobs` may be absent or
/// null, but `jobs` must be an array when present and the root must be an
/// object.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    jobs: Option<Vec<JobEntry>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawDocument> for StoreDocument {
    fn from(raw: RawDocument) -> Self {
        Self {
            version: raw
                .version
                .as_ref()
                .and_then(Value::as_i64)
                .unwrap_or(DEFAULT_VERSION),
            jobs: raw.jobs.unwrap_or_default(),
            extra: raw.extra,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
