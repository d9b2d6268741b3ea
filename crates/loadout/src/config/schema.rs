//! Manifest data structures.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::coordinate::{DependencyDeclaration, Exclusion, PackageCoordinate};
use crate::repository::{RegistryKind, RepositoryDescriptor};

/// A `loadout.toml` manifest.
///
/// Both lists are ordered; the resolver consults repositories and resolves
/// libraries in exactly the order they appear here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    #[serde(default, rename = "repository")]
    pub repositories: Vec<RepositoryEntry>,

    #[serde(default, rename = "library")]
    pub libraries: Vec<LibraryEntry>,
}

/// One `[[repository]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub id: String,
    pub kind: RegistryKind,
    pub endpoint: String,
}

impl RepositoryEntry {
    pub fn to_descriptor(&self) -> Result<RepositoryDescriptor> {
        RepositoryDescriptor::new(&self.id, self.kind, &self.endpoint)
            .with_context(|| format!("invalid repository '{}'", self.id))
    }
}

/// One `[[library]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Package spec: `namespace:name[@constraint]`.
    pub package: String,

    /// Transitive packages this library must never pull in, as
    /// `namespace:name` with `*` wildcards.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Release variant to fetch instead of the default artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl LibraryEntry {
    pub fn to_declaration(&self) -> Result<DependencyDeclaration> {
        let mut coordinate = PackageCoordinate::parse(&self.package)
            .with_context(|| format!("invalid library package '{}'", self.package))?;
        if let Some(variant) = &self.variant {
            coordinate = coordinate.with_variant(variant);
        }

        let mut declaration = DependencyDeclaration::new(coordinate);
        for exclude in &self.exclude {
            let exclusion = Exclusion::parse(exclude).with_context(|| {
                format!("invalid exclusion '{exclude}' for '{}'", self.package)
            })?;
            declaration = declaration.exclude(exclusion);
        }
        Ok(declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[repository]]
        id = "main"
        kind = "oci"
        endpoint = "ghcr.io"

        [[repository]]
        id = "fallback"
        kind = "warg"
        endpoint = "registry.example.com"

        [[library]]
        package = "wasmcp:calculator@^0.1"
        exclude = ["*:http-transport"]

        [[library]]
        package = "acme:widgets"
        variant = "debug"
    "#;

    #[test]
    fn test_manifest_parses_and_preserves_order() {
        let manifest: Manifest = toml::from_str(SAMPLE).unwrap();

        let ids: Vec<_> = manifest.repositories.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["main", "fallback"]);
        assert_eq!(manifest.repositories[1].kind, RegistryKind::Warg);

        let packages: Vec<_> = manifest
            .libraries
            .iter()
            .map(|l| l.package.as_str())
            .collect();
        assert_eq!(packages, ["wasmcp:calculator@^0.1", "acme:widgets"]);
    }

    #[test]
    fn test_entries_convert_to_resolver_values() {
        let manifest: Manifest = toml::from_str(SAMPLE).unwrap();

        let repo = manifest.repositories[0].to_descriptor().unwrap();
        assert_eq!(repo.id(), "main");

        let declaration = manifest.libraries[0].to_declaration().unwrap();
        assert_eq!(declaration.coordinate().name(), "calculator");
        assert!(declaration.exclusions()[0].matches("any", "http-transport"));

        let with_variant = manifest.libraries[1].to_declaration().unwrap();
        assert_eq!(with_variant.coordinate().variant(), Some("debug"));
    }

    #[test]
    fn test_empty_manifest_is_valid() {
        let manifest: Manifest = toml::from_str("").unwrap();
        assert!(manifest.repositories.is_empty());
        assert!(manifest.libraries.is_empty());
    }

    #[test]
    fn test_bad_package_spec_is_rejected() {
        let entry = LibraryEntry {
            package: "not-a-spec".into(),
            exclude: Vec::new(),
            variant: None,
        };
        assert!(entry.to_declaration().is_err());
    }
}
