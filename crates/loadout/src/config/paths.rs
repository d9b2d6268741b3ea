//! Directory and file path conventions for the CLI.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::session::DEFAULT_LIBRARIES_DIR;

/// Manifest location checked first: `loadout.toml` in the working
/// directory.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("loadout.toml")
}

/// Per-user manifest fallback (`~/.config/loadout/loadout.toml` on Linux,
/// platform equivalents elsewhere).
pub fn user_manifest_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Failed to get config directory")?
        .join("loadout")
        .join("loadout.toml"))
}

/// Directory resolved artifacts are materialized into, relative to the
/// working directory.
pub fn default_libraries_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LIBRARIES_DIR)
}
