//! CLI subcommands.

mod read_log;
mod run;

pub use read_log::ReadLog;
pub use run::RunScenario;
