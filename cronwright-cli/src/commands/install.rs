//! `cronwright install`: merge the job catalogue into the store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cronwright_core::store;
use cronwright_reconcile::{reconcile, ReconcileOptions, ReconcileSummary};

use super::super::{now_ms, resolve_workspace, ProfileArg, StoreArg};

/// Arguments for `cronwright install`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Agent workspace; job instructions point at it (default: current directory).
    #[arg(long, short = 'w', value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Agent name used in job instructions.
    #[arg(long, short = 'a', value_name = "NAME")]
    pub agent: Option<String>,

    /// Job catalogue: core | trader.
    #[arg(long, short = 'p', default_value = "core")]
    pub profile: ProfileArg,

    /// Replace managed jobs with the latest definitions and recover an
    /// unreadable store (a backup is always taken first).
    #[arg(long)]
    pub force: bool,

    /// Report what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the summary as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArg,
}

impl InstallArgs {
    pub fn run(self) -> Result<()> {
        let store_path = self.store.resolve()?;
        let workspace = resolve_workspace(self.workspace.as_deref())?;
        let options = ReconcileOptions {
            agent_label: self.agent,
            force: self.force,
            profile: self.profile.into(),
            dry_run: self.dry_run,
        };

        let summary = reconcile(&store_path, &workspace, &options, now_ms())
            .with_context(|| format!("failed to reconcile {}", store_path.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
            );
            return Ok(());
        }

        print_summary(&summary, &options, &store_path, &workspace);
        Ok(())
    }
}

fn print_summary(
    summary: &ReconcileSummary,
    options: &ReconcileOptions,
    store_path: &std::path::Path,
    workspace: &std::path::Path,
) {
    let prefix = if summary.dry_run { "[dry-run] " } else { "" };

    if let Some(backup) = &summary.backup {
        println!(
            "{}",
            format!(
                "⚠️  Unreadable store discarded; original saved to {}",
                backup.display()
            )
            .yellow()
        );
    }

    println!(
        "{prefix}{} '{}' jobs configured ({} new, {} replaced, {} total)",
        "✓".green(),
        options.profile,
        summary.created.len(),
        summary.replaced.len(),
        summary.total
    );
    println!("  Store: {}", store_path.display());
    if !summary.dry_run {
        println!("  Reference: {}", store::reference_path(workspace).display());
    }

    for name in &summary.created {
        println!("  +  {name}");
    }
    for name in &summary.replaced {
        println!("  ✎  {name}");
    }
    for name in &summary.kept {
        println!("  ·  {name}");
    }
    if !summary.kept.is_empty() && !options.force {
        println!(
            "{}",
            "  Existing managed jobs were left as-is; re-run with --force to replace them."
                .bright_black()
        );
    }

    for warning in &summary.warnings {
        println!("{}", format!("⚠️  {warning}").yellow());
    }

    if summary.restart_required && !summary.dry_run {
        println!(
            "{}",
            "⚠️  Apply cron changes by restarting (or starting) the gateway:".yellow()
        );
        println!("{}", "   openclaw gateway restart  # if already running".bright_black());
        println!("{}", "   openclaw gateway start    # if not running".bright_black());
    }
}
