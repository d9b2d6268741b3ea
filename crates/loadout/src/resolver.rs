//! The registry library resolver.

use std::sync::Arc;

use async_trait::async_trait;
use loadout_core::{ComponentLibrary, LibraryLoadingError, LibraryStore};

use crate::coordinate::DependencyDeclaration;
use crate::engine::{RegistryEngine, ResolutionEngine, ResolutionRequest};
use crate::filter::CompatibilityFilter;
use crate::host::HostProfile;
use crate::repository::RepositoryDescriptor;
use crate::session::{DEFAULT_LIBRARIES_DIR, ResolverSession};

/// Resolves component packages from remote registries at runtime.
///
/// Plugins create and configure a resolver by registering both the
/// dependencies to resolve and the repositories they are found in, then
/// register the resolver into the host's library store:
///
/// ```no_run
/// use loadout::{
///     ComponentLibrary, DependencyDeclaration, PackageCoordinate, PathStore,
///     RegistryKind, RegistryLibraryResolver, RepositoryDescriptor,
/// };
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut resolver = RegistryLibraryResolver::new();
/// resolver.add_repository(RepositoryDescriptor::new(
///     "main", RegistryKind::Oci, "ghcr.io",
/// )?);
/// resolver.add_dependency(DependencyDeclaration::new(
///     PackageCoordinate::parse("wasmcp:calculator@^0.1")?,
/// ));
///
/// let mut store = PathStore::new();
/// resolver.register(&mut store).await?;
/// # Ok(())
/// # }
/// ```
///
/// The resolver is created without any repository, so callers must register
/// every repository they need before registering the resolver itself.
/// Fetched artifacts land in the `libraries` directory and are reused on
/// later runs when their digest still matches.
///
/// A resolver is not synchronized: configure it from one place, and do not
/// run `register` concurrently on the same instance.
pub struct RegistryLibraryResolver {
    engine: Arc<dyn ResolutionEngine>,
    session: ResolverSession,
    repositories: Vec<RepositoryDescriptor>,
    dependencies: Vec<DependencyDeclaration>,
}

impl RegistryLibraryResolver {
    /// Create a resolver caching artifacts under the `libraries` directory
    /// relative to the process working directory.
    pub fn new() -> Self {
        Self::with_session(ResolverSession::new(DEFAULT_LIBRARIES_DIR))
    }

    /// Create a resolver with explicit session policy.
    pub fn with_session(session: ResolverSession) -> Self {
        Self::with_engine(Arc::new(RegistryEngine::new()), session)
    }

    /// Create a resolver on a caller-supplied engine.
    pub fn with_engine(engine: Arc<dyn ResolutionEngine>, session: ResolverSession) -> Self {
        Self {
            engine,
            session,
            repositories: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Add a dependency to resolve when registering. The artifact comes
    /// from the first registered repository that can supply it.
    pub fn add_dependency(&mut self, dependency: DependencyDeclaration) {
        self.dependencies.push(dependency);
    }

    /// Add a repository to fetch from. Order matters: resolution consults
    /// repositories in the order they were added.
    pub fn add_repository(&mut self, repository: RepositoryDescriptor) {
        self.repositories.push(repository);
    }

    pub fn repositories(&self) -> &[RepositoryDescriptor] {
        &self.repositories
    }

    pub fn dependencies(&self) -> &[DependencyDeclaration] {
        &self.dependencies
    }

    pub fn session(&self) -> &ResolverSession {
        &self.session
    }
}

impl Default for RegistryLibraryResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComponentLibrary for RegistryLibraryResolver {
    /// Resolve every declared dependency and add the materialized files to
    /// the store.
    ///
    /// The host profile is probed once per call and held fixed for the
    /// whole traversal. On failure the store receives nothing and the
    /// engine error is surfaced as the source of the returned error.
    async fn register(&self, store: &mut dyn LibraryStore) -> Result<(), LibraryLoadingError> {
        let filter = CompatibilityFilter::new(HostProfile::detect());
        tracing::debug!(
            "resolving {} dependencies against {} repositories ({} host)",
            self.dependencies.len(),
            self.repositories.len(),
            filter.profile()
        );

        let request =
            ResolutionRequest::new(self.repositories.clone(), self.dependencies.clone());
        let artifacts = self
            .engine
            .resolve(&self.session, request, &filter)
            .await
            .map_err(LibraryLoadingError::resolution)?;

        for artifact in artifacts {
            store.add_library(artifact.path);
        }
        Ok(())
    }
}
