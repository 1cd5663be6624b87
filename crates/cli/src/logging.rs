//! Tracing setup for the CLI.

use std::env;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// Logs go to stderr, filtered by `RUST_LOG` (default `info`). When
/// `COMBAT_LOG_DIR` is set, a daily-rolling file sink is added as well; the
/// returned guard must stay alive for it to keep writing.
pub fn init() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match env::var_os("COMBAT_LOG_DIR") {
        Some(dir) => {
            std::fs::create_dir_all(&dir).with_context(|| {
                format!("Failed to create log directory: {}", dir.to_string_lossy())
            })?;
            let appender = tracing_appender::rolling::daily(&dir, "combat.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
