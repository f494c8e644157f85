//! File-backed stand-in device for `--offline`.
//!
//! Sections live in `~/.local/state/owrt/offline.toml` between invocations,
//! so a section created offline can be read, updated and deleted by later
//! commands.

use anyhow::{Context, Result};
use lucirpc::backend::memory::{MemoryBackend, Snapshot};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the state directory path (~/.local/state/owrt)
pub fn state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("owrt"))
}

/// Get the offline store path
pub fn store_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("offline.toml"))
}

/// Load the store, or an empty device if the file doesn't exist
pub fn load(path: &Path) -> Result<MemoryBackend> {
    if !path.exists() {
        log::debug!("Offline store does not exist, starting empty");
        return Ok(MemoryBackend::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read offline store: {}", path.display()))?;
    let snapshot: Snapshot = toml::from_str(&content)
        .with_context(|| format!("Failed to parse offline store: {}", path.display()))?;

    log::debug!("Loaded offline store from {}", path.display());
    Ok(MemoryBackend::from_snapshot(snapshot))
}

/// Write every stored section back to disk
pub fn save(path: &Path, backend: &MemoryBackend) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
    }

    let content = toml::to_string_pretty(&backend.snapshot())
        .context("Failed to serialize offline store")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write offline store: {}", path.display()))?;

    log::debug!("Saved offline store to {}", path.display());
    Ok(())
}
