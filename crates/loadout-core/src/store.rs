use std::path::PathBuf;

/// Sink for resolved library files.
///
/// Implemented by host runtimes that load the received files into their
/// component search path. `add_library` accepts a local filesystem path to a
/// previously materialized artifact; making the file actually loadable is
/// the store's concern, not the provider's.
pub trait LibraryStore: Send {
    fn add_library(&mut self, library: PathBuf);
}

/// A [`LibraryStore`] that only collects paths.
///
/// Used by the CLI to print what a resolution produced, and by tests to
/// observe exactly which paths a provider forwarded.
#[derive(Debug, Default)]
pub struct PathStore {
    paths: Vec<PathBuf>,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

impl LibraryStore for PathStore {
    fn add_library(&mut self, library: PathBuf) {
        self.paths.push(library);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_store_keeps_insertion_order() {
        let mut store = PathStore::new();
        store.add_library(PathBuf::from("/a.wasm"));
        store.add_library(PathBuf::from("/b.wasm"));
        store.add_library(PathBuf::from("/a.wasm"));

        assert_eq!(
            store.paths(),
            [
                PathBuf::from("/a.wasm"),
                PathBuf::from("/b.wasm"),
                PathBuf::from("/a.wasm"),
            ]
        );
    }
}
