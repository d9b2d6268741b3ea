//! Manifest and path handling for the CLI.
//!
//! The library API is configured in code; the CLI reads the same
//! configuration from a `loadout.toml` manifest instead:
//!
//! ```toml
//! [[repository]]
//! id = "main"
//! kind = "oci"
//! endpoint = "ghcr.io"
//!
//! [[library]]
//! package = "wasmcp:calculator@^0.1"
//! exclude = ["*:http-transport"]
//! ```
//!
//! Repository and library order in the manifest is the resolution order.

pub mod io;
pub mod paths;
pub mod schema;

pub use io::{load_manifest, locate_manifest};
pub use paths::{default_libraries_dir, default_manifest_path, user_manifest_path};
pub use schema::{LibraryEntry, Manifest, RepositoryEntry};
