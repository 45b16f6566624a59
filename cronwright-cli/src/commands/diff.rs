//! `cronwright diff`: show the unified diff `install` would apply.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cronwright_reconcile::{diff::preview, ReconcileOptions};

use super::super::{now_ms, resolve_workspace, ProfileArg, StoreArg};

/// Arguments for `cronwright diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Agent workspace (default: current directory).
    #[arg(long, short = 'w', value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Agent name used in job instructions.
    #[arg(long, short = 'a', value_name = "NAME")]
    pub agent: Option<String>,

    /// Job catalogue: core | trader.
    #[arg(long, short = 'p', default_value = "core")]
    pub profile: ProfileArg,

    /// Preview a forced install.
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub store: StoreArg,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let store_path = self.store.resolve()?;
        let workspace = resolve_workspace(self.workspace.as_deref())?;
        let options = ReconcileOptions {
            agent_label: self.agent,
            force: self.force,
            profile: self.profile.into(),
            dry_run: true,
        };

        let result = preview(&store_path, &workspace, &options, now_ms())
            .with_context(|| format!("diff failed for {}", store_path.display()))?;

        if result.unified_diff.is_empty() {
            println!("No changes for {}.", store_path.display());
            return Ok(());
        }

        print!("{}", result.unified_diff);
        if !result.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
