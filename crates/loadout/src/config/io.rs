//! Manifest loading.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::paths;
use super::schema::Manifest;

/// Pick the manifest to read: an explicit path wins, then `loadout.toml`
/// in the working directory, then the per-user fallback.
pub fn locate_manifest(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let local = paths::default_manifest_path();
    if local.is_file() {
        return Ok(local);
    }

    let user = paths::user_manifest_path()?;
    if user.is_file() {
        return Ok(user);
    }

    anyhow::bail!(
        "no manifest found: expected {} or {}",
        local.display(),
        user.display()
    )
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_prefers_explicit_path() {
        let explicit = PathBuf::from("/somewhere/else.toml");
        assert_eq!(
            locate_manifest(Some(explicit.clone())).unwrap(),
            explicit
        );
    }

    #[test]
    fn test_load_manifest_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("loadout.toml");
        let err = load_manifest(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_load_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadout.toml");
        std::fs::write(
            &path,
            "[[repository]]\nid = \"main\"\nkind = \"oci\"\nendpoint = \"ghcr.io\"\n",
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.repositories.len(), 1);
        assert!(manifest.libraries.is_empty());
    }
}
