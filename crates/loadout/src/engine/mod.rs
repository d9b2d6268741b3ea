//! Resolution engine contract.
//!
//! The engine owns everything the resolver delegates: transitive graph
//! computation, registry fetch, digest verification, and materialization of
//! accepted nodes into local files. The resolver talks to it through
//! [`ResolutionEngine`] so the orchestration contract can be exercised with
//! a scripted engine in tests.

pub mod registry;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use semver::Version;
use thiserror::Error;

use crate::coordinate::{DependencyDeclaration, PackageCoordinate};
use crate::filter::CompatibilityFilter;
use crate::repository::RepositoryDescriptor;
use crate::session::ResolverSession;

pub use registry::RegistryEngine;

/// Immutable snapshot of a resolver's configuration.
///
/// Built fresh from the then-current repository and dependency lists at
/// each registration run; mutating the resolver afterwards cannot touch a
/// request that already exists. Order of both lists is preserved exactly
/// as added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    repositories: Vec<RepositoryDescriptor>,
    dependencies: Vec<DependencyDeclaration>,
}

impl ResolutionRequest {
    pub fn new(
        repositories: Vec<RepositoryDescriptor>,
        dependencies: Vec<DependencyDeclaration>,
    ) -> Self {
        Self {
            repositories,
            dependencies,
        }
    }

    pub fn repositories(&self) -> &[RepositoryDescriptor] {
        &self.repositories
    }

    pub fn dependencies(&self) -> &[DependencyDeclaration] {
        &self.dependencies
    }
}

/// Exact identity of a resolved graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedCoordinate {
    pub namespace: String,
    pub name: String,
    pub version: Version,
    pub variant: Option<String>,
}

impl fmt::Display for ResolvedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.namespace, self.name, self.version)?;
        if let Some(variant) = &self.variant {
            write!(f, " ({variant})")?;
        }
        Ok(())
    }
}

/// One accepted node of the resolved graph, materialized to a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub coordinate: ResolvedCoordinate,
    pub path: PathBuf,
}

/// Failures of a resolution run. The run fails as a single unit: no
/// partial artifact list escapes alongside one of these.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no repositories registered to resolve {coordinate}")]
    NoRepositories { coordinate: PackageCoordinate },

    #[error("no repository supplies {coordinate}")]
    NotFound { coordinate: PackageCoordinate },

    #[error("repository '{repository}' failed while resolving {coordinate}")]
    Registry {
        repository: String,
        coordinate: String,
        #[source]
        source: wasm_pkg_client::Error,
    },

    #[error("digest mismatch for {coordinate}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        coordinate: ResolvedCoordinate,
        expected: String,
        actual: String,
    },

    #[error("failed to open local artifact store at {}", .path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: wasm_pkg_client::Error,
    },

    #[error("failed to write artifact {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{coordinate} is not a loadable component")]
    InvalidComponent {
        coordinate: ResolvedCoordinate,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Computes the transitive dependency graph for a request and materializes
/// every accepted node into a local file.
///
/// The filter is the authority for inclusion during traversal: a rejected
/// node is not resolved, not downloaded, and nothing reachable only
/// through it is either. Results are reported in traversal order, each
/// declaration followed by its transitive imports.
#[async_trait]
pub trait ResolutionEngine: Send + Sync {
    async fn resolve(
        &self,
        session: &ResolverSession,
        request: ResolutionRequest,
        filter: &CompatibilityFilter,
    ) -> Result<Vec<ResolvedArtifact>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_preserves_order() {
        let repos = vec![
            crate::RepositoryDescriptor::new("first", crate::RegistryKind::Oci, "a.example.com")
                .unwrap(),
            crate::RepositoryDescriptor::new("second", crate::RegistryKind::Warg, "b.example.com")
                .unwrap(),
        ];
        let deps = vec![
            DependencyDeclaration::new(PackageCoordinate::parse("acme:widgets").unwrap()),
            DependencyDeclaration::new(PackageCoordinate::parse("acme:gadgets").unwrap()),
        ];

        let request = ResolutionRequest::new(repos.clone(), deps.clone());
        assert_eq!(request.repositories(), &repos[..]);
        assert_eq!(request.dependencies(), &deps[..]);
    }

    #[test]
    fn test_resolved_coordinate_display() {
        let coordinate = ResolvedCoordinate {
            namespace: "acme".into(),
            name: "widgets".into(),
            version: Version::new(1, 2, 3),
            variant: None,
        };
        assert_eq!(coordinate.to_string(), "acme:widgets@1.2.3");
    }
}
