//! Remote registry descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_pkg_common::registry::Registry;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository id must not be empty")]
    EmptyId,

    #[error("invalid registry endpoint '{endpoint}'")]
    Endpoint {
        endpoint: String,
        #[source]
        source: wasm_pkg_common::Error,
    },
}

/// Protocol a repository speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Oci,
    Warg,
}

impl RegistryKind {
    pub(crate) fn protocol(&self) -> &'static str {
        match self {
            RegistryKind::Oci => "oci",
            RegistryKind::Warg => "warg",
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol())
    }
}

/// A remote package source.
///
/// The order in which descriptors are added to a resolver matters: during
/// resolution the first repository able to supply a coordinate wins, and
/// later repositories are never consulted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    id: String,
    kind: RegistryKind,
    endpoint: String,
}

impl RepositoryDescriptor {
    /// Build a descriptor, validating the endpoint eagerly so malformed
    /// registry addresses fail at configuration time rather than mid-run.
    pub fn new(
        id: impl Into<String>,
        kind: RegistryKind,
        endpoint: impl Into<String>,
    ) -> Result<Self, RepositoryError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RepositoryError::EmptyId);
        }
        let endpoint = endpoint.into();
        endpoint
            .parse::<Registry>()
            .map_err(|source| RepositoryError::Endpoint {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(Self { id, kind, endpoint })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn registry(&self) -> Registry {
        self.endpoint
            .parse()
            .expect("endpoint validated at construction")
    }
}

impl fmt::Display for RepositoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.id, self.kind, self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_accepts_plain_host() {
        let repo = RepositoryDescriptor::new("main", RegistryKind::Oci, "ghcr.io").unwrap();
        assert_eq!(repo.id(), "main");
        assert_eq!(repo.kind(), RegistryKind::Oci);
        assert_eq!(repo.endpoint(), "ghcr.io");
    }

    #[test]
    fn test_descriptor_rejects_empty_id() {
        assert!(matches!(
            RepositoryDescriptor::new("", RegistryKind::Oci, "ghcr.io"),
            Err(RepositoryError::EmptyId)
        ));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RegistryKind::Oci.to_string(), "oci");
        assert_eq!(RegistryKind::Warg.to_string(), "warg");
    }
}
