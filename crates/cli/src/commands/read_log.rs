//! Read and inspect action log files written by the runtime.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use combat_core::BattleId;
use combat_runtime::{ActionRecord, FileActionLog};

use crate::dirs;

/// Read and inspect action log files
#[derive(Parser)]
pub struct ReadLog {
    /// Action log file; defaults to the newest log in the data directory
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Custom data directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Only show records of this battle
    #[arg(short, long, value_name = "ID")]
    battle: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Limit number of records to display (0 = unlimited)
    #[arg(short, long, default_value = "100")]
    limit: usize,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Per-battle totals and action type counts
    Summary,
    /// One line per record
    List,
    /// Full JSON output
    Json,
}

impl ReadLog {
    pub fn execute(self) -> Result<()> {
        let path = match self.file {
            Some(path) => path,
            None => {
                let data_dir = self.data_dir.unwrap_or_else(dirs::data_dir);
                dirs::find_latest_log(&dirs::actions_dir(&data_dir))?
            }
        };

        let records = FileActionLog::read_path(&path)
            .with_context(|| format!("Failed to read action log: {}", path.display()))?;

        let records: Vec<_> = records
            .into_iter()
            .filter(|r| self.battle.is_none_or(|id| r.battle == BattleId(id)))
            .take(if self.limit == 0 {
                usize::MAX
            } else {
                self.limit
            })
            .collect();

        println!("{} {}", style("Log:").bold().cyan(), path.display());
        println!("{} {}", style("Records:").bold().cyan(), records.len());
        println!();

        match self.format {
            OutputFormat::Summary => print_summary(&records),
            OutputFormat::List => print_list(&records),
            OutputFormat::Json => print_json(&records)?,
        }

        Ok(())
    }
}

#[derive(Default)]
struct BattleTotals {
    actions: usize,
    damage: u64,
    healing: u64,
    by_type: BTreeMap<String, usize>,
}

fn print_summary(records: &[ActionRecord]) {
    println!("{}", style("=== Action Summary ===").bold().green());
    println!();

    let mut battles: BTreeMap<BattleId, BattleTotals> = BTreeMap::new();
    for record in records {
        let totals = battles.entry(record.battle).or_default();
        totals.actions += 1;
        totals.damage += u64::from(record.damage_dealt);
        totals.healing += u64::from(record.healing_done);
        *totals
            .by_type
            .entry(record.action_type.to_string())
            .or_default() += 1;
    }

    for (battle, totals) in battles {
        println!("{}", style(format!("Battle {battle}")).bold().yellow());
        println!("  Actions: {}", totals.actions);
        println!("  Damage dealt: {}", totals.damage);
        println!("  Healing done: {}", totals.healing);
        for (action_type, count) in totals.by_type {
            println!("    {action_type}: {count}");
        }
        println!();
    }
}

fn print_list(records: &[ActionRecord]) {
    println!("{}", style("=== Action List ===").bold().green());
    println!();

    for record in records {
        let target = record
            .target
            .map(|t| format!(" -> {t}"))
            .unwrap_or_default();
        println!(
            "{} {} #{:<4} {}{} {}{}  AP {} CP {} SP {}  dmg {} heal {}",
            style(record.resolved_at).dim(),
            record.battle,
            record.sequence,
            record.actor,
            target,
            style(record.action_type).bold(),
            if record.success { "" } else { " (failed)" },
            record.ap_cost,
            record.cp_cost,
            record.sp_cost,
            record.damage_dealt,
            record.healing_done,
        );
    }
}

fn print_json(records: &[ActionRecord]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(records).context("Failed to serialize records to JSON")?;
    println!("{json}");
    Ok(())
}
