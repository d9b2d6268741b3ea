//! Registry-backed resolution engine built on `wasm-pkg-client`.
//!
//! Each repository descriptor becomes its own package client; coordinates
//! are offered to repositories in registration order and the first one able
//! to supply a matching release wins. Transitive dependencies are the
//! packages a downloaded component imports, discovered by decoding its
//! binary, and are walked depth-first under the same filter and exclusion
//! rules as the node that introduced them.

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use semver::{Comparator, Op, Version, VersionReq};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use wasm_pkg_client::{
    caching::{CachingClient, FileCache},
    Client, Release,
};
use wasm_pkg_common::{
    config::{Config, CustomConfig, RegistryMapping},
    metadata::RegistryMetadata,
    package::PackageRef,
};
use wit_component::DecodedWasm;

use crate::coordinate::{DependencyDeclaration, Exclusion, PackageCoordinate};
use crate::engine::{
    EngineError, ResolutionEngine, ResolutionRequest, ResolvedArtifact, ResolvedCoordinate,
};
use crate::filter::CompatibilityFilter;
use crate::repository::{RegistryKind, RepositoryDescriptor};
use crate::session::{ChecksumPolicy, ResolverSession};

/// Import namespaces satisfied by the host world rather than by registry
/// packages. Closure does not descend into them.
const HOST_NAMESPACES: [&str; 1] = ["wasi"];

/// Subdirectory of the libraries directory holding the content-addressed
/// download cache.
const CACHE_SUBDIR: &str = ".cache";

/// The production [`ResolutionEngine`].
#[derive(Debug, Default)]
pub struct RegistryEngine;

impl RegistryEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResolutionEngine for RegistryEngine {
    async fn resolve(
        &self,
        session: &ResolverSession,
        request: ResolutionRequest,
        filter: &CompatibilityFilter,
    ) -> Result<Vec<ResolvedArtifact>, EngineError> {
        let libraries_dir = session.libraries_dir().to_path_buf();
        tokio::fs::create_dir_all(&libraries_dir)
            .await
            .map_err(|source| EngineError::Io {
                path: libraries_dir.clone(),
                source,
            })?;

        let cache_dir = libraries_dir.join(CACHE_SUBDIR);
        let cache = FileCache::new(&cache_dir)
            .await
            .map_err(|source| EngineError::Cache {
                path: cache_dir,
                source,
            })?;

        let repositories: Vec<RepositoryClient> = request
            .repositories()
            .iter()
            .map(|descriptor| RepositoryClient::connect(descriptor, cache.clone()))
            .collect();

        let mut walk = Walk {
            session,
            filter,
            repositories: &repositories,
            visited: HashSet::new(),
            artifacts: Vec::new(),
        };
        for declaration in request.dependencies() {
            walk.resolve_declaration(declaration).await?;
        }
        Ok(walk.artifacts)
    }
}

/// One repository descriptor bound to a package client that treats it as
/// the default (and only) registry.
struct RepositoryClient {
    descriptor: RepositoryDescriptor,
    client: CachingClient<FileCache>,
}

impl RepositoryClient {
    fn connect(descriptor: &RepositoryDescriptor, cache: FileCache) -> Self {
        let mut config = Config::empty();
        config.set_default_registry(Some(RegistryMapping::Custom(CustomConfig {
            registry: descriptor.registry(),
            metadata: registry_metadata(descriptor),
        })));
        Self {
            descriptor: descriptor.clone(),
            client: CachingClient::new(Some(Client::new(config)), cache),
        }
    }
}

fn registry_metadata(descriptor: &RepositoryDescriptor) -> RegistryMetadata {
    let endpoint = descriptor.endpoint();
    let value = match descriptor.kind() {
        RegistryKind::Oci => serde_json::json!({
            "preferredProtocol": "oci",
            "oci": { "registry": endpoint },
        }),
        RegistryKind::Warg => serde_json::json!({
            "preferredProtocol": "warg",
            "warg": { "url": format!("https://{endpoint}") },
        }),
    };
    serde_json::from_value(value).expect("static registry metadata")
}

struct Walk<'a> {
    session: &'a ResolverSession,
    filter: &'a CompatibilityFilter,
    repositories: &'a [RepositoryClient],
    visited: HashSet<ResolvedCoordinate>,
    artifacts: Vec<ResolvedArtifact>,
}

/// A package another component's binary declares it imports.
struct PackageImport {
    namespace: String,
    name: String,
    version: Option<Version>,
}

impl Walk<'_> {
    async fn resolve_declaration(
        &mut self,
        declaration: &DependencyDeclaration,
    ) -> Result<(), EngineError> {
        self.resolve_node(declaration.coordinate().clone(), declaration.exclusions())
            .await
    }

    /// Resolve one graph node and, depth-first, everything it imports.
    ///
    /// Boxed because async recursion needs an indirection.
    fn resolve_node<'s>(
        &'s mut self,
        coordinate: PackageCoordinate,
        exclusions: &'s [Exclusion],
    ) -> Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 's>> {
        Box::pin(async move {
            if !self.filter.accept(&coordinate) {
                return Ok(());
            }
            if self.repositories.is_empty() {
                return Err(EngineError::NoRepositories { coordinate });
            }

            let (repository, release) = pick_release(self.repositories, &coordinate).await?;
            let resolved = ResolvedCoordinate {
                namespace: coordinate.namespace().to_string(),
                name: coordinate.name().to_string(),
                version: release.version.clone(),
                variant: coordinate.variant().map(str::to_string),
            };
            if !self.visited.insert(resolved.clone()) {
                return Ok(());
            }

            let path = self.materialize(repository, &release, &resolved).await?;
            self.artifacts.push(ResolvedArtifact {
                coordinate: resolved.clone(),
                path: path.clone(),
            });

            for import in component_package_imports(&path, &resolved)? {
                if HOST_NAMESPACES.contains(&import.namespace.as_str()) {
                    continue;
                }
                if import.namespace == resolved.namespace && import.name == resolved.name {
                    continue;
                }
                if exclusions
                    .iter()
                    .any(|exclusion| exclusion.matches(&import.namespace, &import.name))
                {
                    tracing::debug!(
                        "skipping excluded dependency {}:{} of {resolved}",
                        import.namespace,
                        import.name
                    );
                    continue;
                }

                let mut child = PackageCoordinate::new(&import.namespace, &import.name)
                    .map_err(|source| EngineError::InvalidComponent {
                        coordinate: resolved.clone(),
                        source: Box::new(source),
                    })?;
                if let Some(version) = &import.version {
                    child = child.with_version(exact_requirement(version));
                }
                self.resolve_node(child, exclusions).await?;
            }

            Ok(())
        })
    }

    /// Download the release into the libraries directory, verifying its
    /// content digest. A file already present with the expected digest is
    /// reused without a transfer.
    async fn materialize(
        &self,
        repository: &RepositoryClient,
        release: &Release,
        resolved: &ResolvedCoordinate,
    ) -> Result<PathBuf, EngineError> {
        let path = self
            .session
            .libraries_dir()
            .join(artifact_file_name(resolved));
        let expected = release.content_digest.to_string();

        if let Ok(existing) = tokio::fs::read(&path).await {
            if sha256_digest(&existing) == expected {
                tracing::debug!("reusing cached {resolved} at {}", path.display());
                return Ok(path);
            }
        }

        self.session
            .notify_transfer(repository.descriptor.endpoint(), &resolved.to_string());

        let package = package_ref_parts(&resolved.namespace, &resolved.name);
        let registry_err = |source| EngineError::Registry {
            repository: repository.descriptor.id().to_string(),
            coordinate: resolved.to_string(),
            source,
        };
        let io_err = |source| EngineError::Io {
            path: path.clone(),
            source,
        };

        let mut stream = repository
            .client
            .get_content(&package, release)
            .await
            .map_err(registry_err)?;

        let mut hasher = Sha256::new();
        let mut file = tokio::fs::File::create(&path).await.map_err(io_err)?;
        while let Some(chunk) = stream.try_next().await.map_err(registry_err)? {
            hasher.update(&chunk);
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)?;

        let actual = format!("sha256:{:x}", hasher.finalize());
        if actual != expected {
            match self.session.checksum_policy() {
                ChecksumPolicy::Strict => {
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(EngineError::ChecksumMismatch {
                        coordinate: resolved.clone(),
                        expected,
                        actual,
                    });
                }
                ChecksumPolicy::Lenient => {
                    tracing::warn!(
                        "digest mismatch for {resolved}: expected {expected}, got {actual}"
                    );
                }
            }
        }

        Ok(path)
    }
}

/// Offer the coordinate to repositories in registration order; the first
/// one holding a matching non-yanked release supplies it.
async fn pick_release<'r>(
    repositories: &'r [RepositoryClient],
    coordinate: &PackageCoordinate,
) -> Result<(&'r RepositoryClient, Release), EngineError> {
    let package = package_ref(coordinate);

    for repository in repositories {
        let versions = match repository.client.list_all_versions(&package).await {
            Ok(versions) => versions,
            Err(err) => {
                tracing::debug!(
                    "repository '{}' cannot supply {coordinate}: {err}",
                    repository.descriptor.id()
                );
                continue;
            }
        };

        let best = matching_version(
            versions.into_iter().map(|info| (info.version, info.yanked)),
            coordinate.version(),
        );

        if let Some(version) = best {
            let release = repository
                .client
                .get_release(&package, &version)
                .await
                .map_err(|source| EngineError::Registry {
                    repository: repository.descriptor.id().to_string(),
                    coordinate: coordinate.to_string(),
                    source,
                })?;
            return Ok((repository, release));
        }
    }

    Err(EngineError::NotFound {
        coordinate: coordinate.clone(),
    })
}

fn package_ref(coordinate: &PackageCoordinate) -> PackageRef {
    package_ref_parts(coordinate.namespace(), coordinate.name())
}

fn package_ref_parts(namespace: &str, name: &str) -> PackageRef {
    format!("{namespace}:{name}")
        .parse()
        .expect("coordinate labels are valid package labels")
}

fn artifact_file_name(resolved: &ResolvedCoordinate) -> String {
    match &resolved.variant {
        Some(variant) => format!(
            "{}_{}@{}+{variant}.wasm",
            resolved.namespace, resolved.name, resolved.version
        ),
        None => format!(
            "{}_{}@{}.wasm",
            resolved.namespace, resolved.name, resolved.version
        ),
    }
}

/// Pick the newest non-yanked version satisfying the constraint, if any.
fn matching_version(
    versions: impl IntoIterator<Item = (Version, bool)>,
    constraint: Option<&VersionReq>,
) -> Option<Version> {
    versions
        .into_iter()
        .filter(|(_, yanked)| !yanked)
        .filter(|(version, _)| constraint.map_or(true, |req| req.matches(version)))
        .map(|(version, _)| version)
        .max()
}

fn sha256_digest(bytes: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(bytes))
}

fn exact_requirement(version: &Version) -> VersionReq {
    VersionReq {
        comparators: vec![Comparator {
            op: Op::Exact,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: version.pre.clone(),
        }],
    }
}

/// Decode a component binary and collect the packages its world imports.
fn component_package_imports(
    path: &Path,
    resolved: &ResolvedCoordinate,
) -> Result<Vec<PackageImport>, EngineError> {
    let bytes = std::fs::read(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded =
        wit_component::decode(&bytes).map_err(|source| EngineError::InvalidComponent {
            coordinate: resolved.clone(),
            source: source.into(),
        })?;
    let (resolve, world_id) = match decoded {
        DecodedWasm::Component(resolve, world_id) => (resolve, world_id),
        DecodedWasm::WitPackage(..) => {
            return Err(EngineError::InvalidComponent {
                coordinate: resolved.clone(),
                source: "expected a component, found a WIT package".into(),
            });
        }
    };

    let world = &resolve.worlds[world_id];
    let mut seen = HashSet::new();
    let mut imports = Vec::new();
    for (key, _item) in &world.imports {
        let wit_parser::WorldKey::Interface(id) = key else {
            continue;
        };
        let interface = &resolve.interfaces[*id];
        let Some(package_id) = interface.package else {
            continue;
        };
        let package = &resolve.packages[package_id];
        let namespace = package.name.namespace.clone();
        let name = package.name.name.clone();
        if seen.insert((namespace.clone(), name.clone())) {
            imports.push(PackageImport {
                namespace,
                name,
                version: package.name.version.clone(),
            });
        }
    }
    Ok(imports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_name() {
        let resolved = ResolvedCoordinate {
            namespace: "acme".into(),
            name: "widgets".into(),
            version: Version::new(1, 2, 3),
            variant: None,
        };
        assert_eq!(artifact_file_name(&resolved), "acme_widgets@1.2.3.wasm");

        let with_variant = ResolvedCoordinate {
            variant: Some("debug".into()),
            ..resolved
        };
        assert_eq!(
            artifact_file_name(&with_variant),
            "acme_widgets@1.2.3+debug.wasm"
        );
    }

    #[test]
    fn test_exact_requirement_matches_only_that_version() {
        let req = exact_requirement(&Version::new(1, 2, 3));
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(!req.matches(&Version::new(1, 2, 4)));
        assert!(!req.matches(&Version::new(2, 2, 3)));
    }

    #[test]
    fn test_exact_requirement_keeps_prerelease() {
        let version: Version = "1.0.0-beta.2".parse().unwrap();
        let req = exact_requirement(&version);
        assert!(req.matches(&version));
        assert!(!req.matches(&Version::new(1, 0, 0)));
    }

    #[test]
    fn test_matching_version_prefers_newest_match() {
        let versions = vec![
            (Version::new(1, 0, 0), false),
            (Version::new(1, 4, 2), false),
            (Version::new(2, 0, 0), false),
        ];
        let constraint: VersionReq = "^1".parse().unwrap();
        assert_eq!(
            matching_version(versions, Some(&constraint)),
            Some(Version::new(1, 4, 2))
        );
    }

    #[test]
    fn test_matching_version_skips_yanked_releases() {
        let versions = vec![
            (Version::new(1, 0, 0), false),
            (Version::new(1, 1, 0), true),
        ];
        assert_eq!(matching_version(versions, None), Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn test_matching_version_without_candidates() {
        let constraint: VersionReq = "^3".parse().unwrap();
        let versions = vec![(Version::new(1, 0, 0), false)];
        assert_eq!(matching_version(versions, Some(&constraint)), None);
    }

    #[test]
    fn test_sha256_digest_format() {
        assert_eq!(
            sha256_digest(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
