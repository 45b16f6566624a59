//! cronwright: keeps the gateway scheduler's job store in line with the
//! generated job catalogue.
//!
//! # Usage
//!
//! ```text
//! cronwright install [--workspace <dir>] [--agent <name>] [--profile core|trader]
//!                    [--force] [--dry-run] [--store <file>] [--json]
//! cronwright status  [--profile core|trader] [--store <file>] [--json]
//! cronwright diff    [--workspace <dir>] [--agent <name>] [--profile core|trader]
//!                    [--force] [--store <file>]
//! ```

mod commands;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{diff::DiffArgs, install::InstallArgs, status::StatusArgs};
use cronwright_core::store;
use cronwright_reconcile::Profile;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "cronwright",
    version,
    about = "Reconcile generated automation jobs into the gateway scheduler's job store",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge the job catalogue into the store (adds missing jobs; --force replaces).
    Install(InstallArgs),

    /// Show which managed jobs are present in the store.
    Status(StatusArgs),

    /// Show a unified diff of what `install` would write.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Shared arguments
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `Profile` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileArg(pub Profile);

impl FromStr for ProfileArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "core" => Ok(Self(Profile::Core)),
            "trader" => Ok(Self(Profile::Trader)),
            other => Err(format!("unknown profile '{other}'; expected: core, trader")),
        }
    }
}

impl fmt::Display for ProfileArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ProfileArg> for Profile {
    fn from(p: ProfileArg) -> Self {
        p.0
    }
}

/// Store location override shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct StoreArg {
    /// Job store file (default: ~/.openclaw/cron/jobs.json).
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,
}

impl StoreArg {
    pub fn resolve(&self) -> Result<PathBuf> {
        match &self.store {
            Some(path) => Ok(path.clone()),
            None => store::default_store_path().context("could not locate the job store"),
        }
    }
}

/// Resolve `--workspace`, defaulting to the current directory.
pub fn resolve_workspace(workspace: Option<&Path>) -> Result<PathBuf> {
    let path = match workspace {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().context("could not determine current directory")?,
    };
    path.canonicalize()
        .with_context(|| format!("cannot resolve workspace '{}'", path.display()))
}

/// Wall clock for stamping generated jobs.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    log::debug!("{:?}", cli.command);
    match cli.command {
        Commands::Install(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}
