pub mod config;
pub mod coordinate;
pub mod engine;
pub mod filter;
pub mod host;
pub mod logging;
pub mod repository;
pub mod resolver;
pub mod session;

pub use coordinate::{CoordinateError, DependencyDeclaration, Exclusion, PackageCoordinate};
pub use filter::CompatibilityFilter;
pub use host::HostProfile;
pub use repository::{RegistryKind, RepositoryDescriptor, RepositoryError};
pub use resolver::RegistryLibraryResolver;
pub use session::ResolverSession;

// Re-exported so host runtimes depending on `loadout` alone can implement
// the registration surface.
pub use loadout_core::{ComponentLibrary, FileLibrary, LibraryLoadingError, LibraryStore, PathStore};
