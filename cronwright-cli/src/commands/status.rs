//! `cronwright status`: which managed jobs the store currently holds.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use cronwright_reconcile::health::{inspect, StoreHealth, StoreState, Verdict};

use super::super::{ProfileArg, StoreArg};

/// Arguments for `cronwright status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Job catalogue to check: core | trader.
    #[arg(long, short = 'p', default_value = "core")]
    pub profile: ProfileArg,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArg,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let store_path = self.store.resolve()?;
        let health = inspect(&store_path, self.profile.into())
            .with_context(|| format!("failed to inspect {}", store_path.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&health).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&health);
        Ok(())
    }
}

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "job")]
    name: String,
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "status")]
    status: String,
}

fn print_table(health: &StoreHealth) {
    println!(
        "cronwright v{} | profile {} | {}",
        env!("CARGO_PKG_VERSION"),
        health.profile,
        health.path.display()
    );

    match &health.state {
        StoreState::Missing => {
            println!("{} Store not found (run: cronwright install)", verdict_indicator(Verdict::Missing));
            return;
        }
        StoreState::Unreadable(reason) => {
            println!("{} {reason}", verdict_indicator(Verdict::Missing));
            return;
        }
        StoreState::Ok => {}
    }

    let rows: Vec<JobRow> = health
        .managed
        .iter()
        .map(|m| JobRow {
            name: m.name.clone(),
            key: m.key.to_string(),
            status: match (m.present, m.enabled) {
                (false, _) => "MISSING".to_string(),
                (true, Some(false)) => "DISABLED".to_string(),
                (true, _) => "PRESENT".to_string(),
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let verdict = health.verdict();
    println!(
        "{} {}/{} managed jobs present | {} other jobs | {} total",
        verdict_indicator(verdict),
        health.present(),
        health.managed.len(),
        health.unmanaged,
        health.total
    );
    if verdict != Verdict::Ok {
        println!("Run 'cronwright install --profile {}' to add missing jobs.", health.profile);
    }
}

fn verdict_indicator(verdict: Verdict) -> String {
    match verdict {
        Verdict::Ok => "■".green().bold().to_string(),
        Verdict::Warn => "■".yellow().bold().to_string(),
        Verdict::Missing => "■".red().bold().to_string(),
    }
}
