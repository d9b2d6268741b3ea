//! Registration surface shared by library providers and host runtimes.
//!
//! A host runtime that wants to extend its component search path at boot
//! accepts any number of [`ComponentLibrary`] values and drains each of them
//! into its [`LibraryStore`]. Providers range from the trivial
//! [`FileLibrary`] (a component file already on disk) to full registry
//! resolvers that download transitive dependency graphs before handing
//! paths over.

mod error;
mod library;
mod store;

pub use error::LibraryLoadingError;
pub use library::{ComponentLibrary, FileLibrary};
pub use store::{LibraryStore, PathStore};
