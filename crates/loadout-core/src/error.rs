use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a [`ComponentLibrary`](crate::ComponentLibrary) into
/// entries of a [`LibraryStore`](crate::LibraryStore).
///
/// A provider fails as a whole: when this error is returned the store has
/// received no paths from that provider.
#[derive(Debug, Error)]
pub enum LibraryLoadingError {
    /// Resolving or downloading the library graph failed. The underlying
    /// engine failure is preserved as the error source.
    #[error("error resolving libraries")]
    Resolution(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// A library that was expected to already exist on disk does not.
    #[error("library file not found: {}", .0.display())]
    NotFound(PathBuf),
}

impl LibraryLoadingError {
    /// Wrap an engine failure, keeping it reachable through `source()`.
    pub fn resolution(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Resolution(Box::new(source))
    }
}
