//! Platform-specific directory utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Platform data directory for the combat tools
///
/// - macOS: `~/Library/Application Support/ninja-combat`
/// - Linux: `~/.local/share/ninja-combat` (or `$XDG_DATA_HOME/ninja-combat`)
/// - Windows: `%APPDATA%\ninja-combat`
/// - Fallback: `./combat_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "ninja-combat")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./combat_data"))
}

/// Directory holding action logs under `data_dir`.
pub fn actions_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("actions")
}

/// Newest `actions_*.log` file in `dir`, by modification time.
pub fn find_latest_log(dir: &Path) -> Result<PathBuf> {
    let mut logs = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read actions directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file()
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
            && name.starts_with("actions_")
            && name.ends_with(".log")
        {
            let modified = entry.metadata()?.modified()?;
            logs.push((path, modified));
        }
    }

    logs.sort_by(|a, b| b.1.cmp(&a.1));
    logs.into_iter()
        .next()
        .map(|(path, _)| path)
        .with_context(|| format!("No action logs found in {}", dir.display()))
}
