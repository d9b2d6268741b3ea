use std::path::PathBuf;

use async_trait::async_trait;

use crate::{LibraryLoadingError, LibraryStore};

/// A source of component libraries that can register itself into a
/// [`LibraryStore`].
///
/// Host runtimes treat every provider uniformly through this one operation.
/// Implementations may be as simple as [`FileLibrary`] or may perform full
/// registry resolution with network I/O; either way `register` completes
/// only once every path the provider will contribute has been handed to the
/// store, and hands over nothing at all on failure.
#[async_trait]
pub trait ComponentLibrary {
    async fn register(&self, store: &mut dyn LibraryStore) -> Result<(), LibraryLoadingError>;
}

/// A single component file that is already on disk.
#[derive(Debug, Clone)]
pub struct FileLibrary {
    path: PathBuf,
}

impl FileLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ComponentLibrary for FileLibrary {
    async fn register(&self, store: &mut dyn LibraryStore) -> Result<(), LibraryLoadingError> {
        if !self.path.is_file() {
            return Err(LibraryLoadingError::NotFound(self.path.clone()));
        }
        store.add_library(self.path.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathStore;

    #[tokio::test]
    async fn test_file_library_registers_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("handler.wasm");
        std::fs::write(&file, b"\0asm").unwrap();

        let mut store = PathStore::new();
        FileLibrary::new(&file).register(&mut store).await.unwrap();

        assert_eq!(store.paths(), [file]);
    }

    #[tokio::test]
    async fn test_file_library_missing_file_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.wasm");

        let mut store = PathStore::new();
        let err = FileLibrary::new(&missing)
            .register(&mut store)
            .await
            .unwrap_err();

        assert!(matches!(err, LibraryLoadingError::NotFound(_)));
        assert!(store.paths().is_empty());
    }
}
