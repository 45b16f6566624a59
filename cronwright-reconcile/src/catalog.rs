//! Desired-set generator: the fixed catalogue of jobs this tool manages.
//!
//! Every job has a literal key compiled into the tables below. Two runs,
//! whether a minute or a release apart, therefore target the same store
//! entries. Never derive keys at runtime.

use std::fmt;
use std::path::Path;

use cronwright_core::{
    Isolation, Job, JobKey, Payload, PostMode, Schedule, SessionTarget, WakeMode,
};

/// Label substituted when the caller supplies none (or only whitespace).
pub const DEFAULT_AGENT_LABEL: &str = "Jane";

const AGENT: &str = "{agent}";
const WORKSPACE: &str = "{workspace}";

/// Which catalogue to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Memory-maintenance jobs for a personal agent workspace.
    #[default]
    Core,
    /// Trading-bot supervision and journaling jobs.
    Trader,
}

impl Profile {
    pub fn all() -> &'static [Profile] {
        &[Profile::Core, Profile::Trader]
    }

    fn templates(self) -> &'static [JobTemplate] {
        match self {
            Profile::Core => CORE_JOBS,
            Profile::Trader => TRADER_JOBS,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Core => write!(f, "core"),
            Profile::Trader => write!(f, "trader"),
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Action {
    /// `systemEvent`: `{workspace}` is substituted.
    Command(&'static str),
    /// `agentTurn`: `{agent}` and `{workspace}` are substituted.
    Message(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct JobTemplate {
    key: &'static str,
    name: &'static str,
    enabled: bool,
    expr: &'static str,
    session: SessionTarget,
    action: Action,
    /// `(postToMainPrefix, postToMainMaxChars)`
    isolation: Option<(&'static str, u32)>,
}

impl JobTemplate {
    fn render(&self, workspace: &str, agent: &str, now_ms: i64) -> Job {
        let payload = match self.action {
            Action::Command(cmd) => Payload::SystemEvent {
                command: cmd.replace(WORKSPACE, workspace),
            },
            Action::Message(msg) => Payload::AgentTurn {
                message: msg.replace(AGENT, agent).replace(WORKSPACE, workspace),
            },
        };
        Job {
            key: JobKey::from(self.key),
            name: self.name.to_owned(),
            enabled: self.enabled,
            delete_after_run: false,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            schedule: Schedule::cron(self.expr),
            session_target: self.session,
            wake_mode: WakeMode::NextHeartbeat,
            payload,
            isolation: self.isolation.map(|(prefix, max_chars)| Isolation {
                post_to_main_prefix: prefix.to_owned(),
                post_to_main_mode: PostMode::Summary,
                post_to_main_max_chars: max_chars,
            }),
        }
    }
}

const CORE_JOBS: &[JobTemplate] = &[
    JobTemplate {
        key: "9a7b3a2d-7c15-4e45-9e69-4ed6d7d3750b",
        name: "Weekly Synthesis",
        enabled: true,
        expr: "0 9 * * 1",
        session: SessionTarget::Isolated,
        action: Action::Message(
            "Agent: {agent}. Weekly Synthesis: Run {workspace}/scripts/weekly-synthesis.sh to apply memory decay and regenerate entity summaries. Use the exec tool to run the script. Only modify workspace files; do not send any external messages. Then write a short [weekly-synthesis] note into today's memory file.",
        ),
        isolation: Some(("Cron", 8000)),
    },
    JobTemplate {
        key: "64e59bfe-8f38-4bad-8def-29449d957d34",
        name: "Daily Memory Distill",
        enabled: true,
        expr: "55 23 * * *",
        session: SessionTarget::Main,
        action: Action::Message(
            "Agent: {agent}. Daily Memory Distill: Read today's {workspace}/memory/YYYY-MM-DD.md. Append a structured [summary] block with: key-events, decisions, todos, promote-to-memory. Only edit the memory file; do not chat.",
        ),
        isolation: None,
    },
    JobTemplate {
        key: "c5e53f94-5ee8-476f-a1e6-e29160f57a7b",
        name: "Nightly Improvement",
        enabled: true,
        expr: "15 22 * * *",
        session: SessionTarget::Isolated,
        action: Action::Message(
            "Agent: {agent}. Nightly Improvement: Read today's {workspace}/memory/YYYY-MM-DD.md logs. Analyze for patterns, friction, or opportunities. Implement ONE concrete improvement (fix bug, add script, improve workflow). Only local changes; no external APIs. Log with [task] id=cron/nightly-improvement. Do not chat.",
        ),
        isolation: Some(("Cron", 8000)),
    },
    JobTemplate {
        key: "8816f6a6-6ad8-40e2-a340-5557ad00601d",
        name: "Cost Savings Searcher",
        enabled: true,
        expr: "15 23 * * *",
        session: SessionTarget::Isolated,
        action: Action::Message(
            "Agent: {agent}. Cost Savings Searcher: Analyze recent {workspace}/memory/*.md logs and scheduler usage patterns for token optimization opportunities. Look for: over-verbose replies, redundant context, inefficient schedules. Propose and implement safe local changes (workspace-only). Record changes as [experiment] entries in MEMORY.md or memory logs. Log with [task] id=cron/cost-savings. Do not chat.",
        ),
        isolation: Some(("Cron", 8000)),
    },
    JobTemplate {
        key: "cf2950a3-7197-49c0-91e3-847bb912e405",
        name: "Weekly Experiment Review",
        enabled: false,
        expr: "0 9 * * 1",
        session: SessionTarget::Isolated,
        action: Action::Message(
            "Agent: {agent}. Weekly Experiment Review: Scan recent {workspace}/memory/*.md for [experiment] entries without [experiment-result]. For each, analyze outcome, write result block, update MEMORY.md rules where appropriate. Only edit memory files and MEMORY.md; no code changes. Write a short summary into today's memory file.",
        ),
        isolation: Some(("Cron", 8000)),
    },
    JobTemplate {
        key: "51c9003f-bc7d-4ea0-8228-bc4faa7e0d6d",
        name: "Weekly Bug Sweep",
        enabled: false,
        expr: "30 9 * * 1",
        session: SessionTarget::Isolated,
        action: Action::Message(
            "Agent: {agent}. Weekly Bug Sweep: Scan recent {workspace}/memory/*.md for [bug] and [incident] entries. Ensure each has root cause and fix documented; update MEMORY.md rules where patterns emerge. Only edit memory/*.md and MEMORY.md; no code changes. Write a short summary into today's memory file.",
        ),
        isolation: Some(("Cron", 8000)),
    },
];

const TRADER_JOBS: &[JobTemplate] = &[
    JobTemplate {
        key: "trader-health-check",
        name: "Trader Health Check",
        enabled: true,
        expr: "*/5 * * * *",
        session: SessionTarget::Main,
        action: Action::Command("{workspace}/scripts/health_check.sh"),
        isolation: None,
    },
    JobTemplate {
        key: "trader-restart-runner",
        name: "Trader Restart Runner",
        enabled: true,
        expr: "* * * * *",
        session: SessionTarget::Main,
        action: Action::Command("{workspace}/scripts/restart_runner.sh"),
        isolation: None,
    },
    JobTemplate {
        key: "trader-report-wallet",
        name: "Trader Report Wallet",
        enabled: true,
        expr: "0 0 * * 0",
        session: SessionTarget::Main,
        action: Action::Command("{workspace}/scripts/report_wallet.sh"),
        isolation: None,
    },
    JobTemplate {
        key: "trader-daily-recap-template",
        name: "Trader Daily Recap Template",
        enabled: true,
        expr: "55 23 * * *",
        session: SessionTarget::Main,
        action: Action::Command("{workspace}/scripts/daily_recap.sh"),
        isolation: None,
    },
    JobTemplate {
        key: "trader-daily-synthesis",
        name: "Trader Daily Synthesis",
        enabled: true,
        expr: "0 0 * * *",
        session: SessionTarget::Isolated,
        action: Action::Message(
            "Agent: {agent}. Daily Synthesis: Read journal/trades/ and journal/decisions/ for today. Fill in journal/recaps/YYYY-MM-DD.md with: 1) What happened (trades, blocks, errors), 2) What worked/didn't, 3) Top 3 learnings, 4) 1-3 suggested tweaks (small + reversible). Write suggestions to suggestions/pending.json for human approval. Only edit journal files and suggestions/pending.json; no code changes.",
        ),
        isolation: Some(("Trader", 4000)),
    },
    JobTemplate {
        key: "trader-weekly-template",
        name: "Trader Weekly Template",
        enabled: true,
        expr: "55 8 * * 1",
        session: SessionTarget::Main,
        action: Action::Command("{workspace}/scripts/weekly_synthesis.sh"),
        isolation: None,
    },
    JobTemplate {
        key: "trader-weekly-synthesis",
        name: "Trader Weekly Synthesis",
        enabled: true,
        expr: "0 9 * * 1",
        session: SessionTarget::Isolated,
        action: Action::Message(
            "Agent: {agent}. Weekly Synthesis: Read all daily recaps from last week. Fill in journal/recaps/WEEK-YYYY-WW.md with: 1) What changed in behavior across the week, 2) Which market conditions hurt/helped, 3) Confirmed rules to pin, 4) Rules to delete. Update knowledge/tacit/ with confirmed patterns. Keep it short and focused. Only edit journal and knowledge/tacit/ files.",
        ),
        isolation: Some(("Trader", 4000)),
    },
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Trimmed agent label, or [`DEFAULT_AGENT_LABEL`] when blank.
pub fn agent_label(label: Option<&str>) -> &str {
    match label.map(str::trim) {
        Some(l) if !l.is_empty() => l,
        _ => DEFAULT_AGENT_LABEL,
    }
}

/// Produce the desired job list for `profile`, in catalogue order.
///
/// Pure: no I/O and no clock reads. Both timestamps are set to `now_ms`.
/// `agent` and `workspace` only ever appear in payload text.
pub fn generate(profile: Profile, workspace: &Path, agent: Option<&str>, now_ms: i64) -> Vec<Job> {
    let agent = agent_label(agent);
    let workspace = workspace.display().to_string();
    profile
        .templates()
        .iter()
        .map(|t| t.render(&workspace, agent, now_ms))
        .collect()
}

/// `(key, name)` of every job `profile` manages, in catalogue order.
pub fn managed_jobs(profile: Profile) -> impl Iterator<Item = (JobKey, &'static str)> {
    profile
        .templates()
        .iter()
        .map(|t| (JobKey::from(t.key), t.name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
