//! Command-line tools for the combat engine.
//!
//! Runs scripted battle scenarios against the runtime and inspects the
//! action logs they leave behind.

mod commands;
mod dirs;
mod logging;
mod scenario;

use anyhow::Result;
use clap::Parser;
use commands::{ReadLog, RunScenario};

/// Grid combat engine tools
#[derive(Parser)]
#[command(name = "combat")]
#[command(about = "Run battle scenarios and inspect action logs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play a scripted battle scenario (TOML)
    Run(RunScenario),

    /// Read and inspect an action log file
    ReadLog(ReadLog),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = logging::init()?;

    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::ReadLog(cmd) => cmd.execute(),
    }
}
