use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use loadout::{
    config, logging, ComponentLibrary, HostProfile, PathStore, RegistryLibraryResolver,
    ResolverSession,
};

#[derive(Parser)]
#[command(
    name = "loadout",
    about = "Resolve component package dependencies into a local library directory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Resolve every library in the manifest and print the materialized paths
    Resolve {
        /// Manifest to read (defaults to ./loadout.toml, then the user config directory)
        #[arg(long, short = 'm')]
        manifest: Option<PathBuf>,

        /// Directory to materialize artifacts into (defaults to ./libraries)
        #[arg(long)]
        libraries_dir: Option<PathBuf>,
    },

    /// Print the detected host profile
    Host,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    match Cli::parse().command {
        Command::Resolve {
            manifest,
            libraries_dir,
        } => resolve(manifest, libraries_dir).await,
        Command::Host => {
            println!("{}", HostProfile::detect());
            Ok(())
        }
    }
}

async fn resolve(manifest: Option<PathBuf>, libraries_dir: Option<PathBuf>) -> Result<()> {
    let manifest_path = config::locate_manifest(manifest)?;
    let manifest = config::load_manifest(&manifest_path)?;
    let libraries_dir = libraries_dir.unwrap_or_else(config::default_libraries_dir);

    let mut resolver =
        RegistryLibraryResolver::with_session(ResolverSession::new(libraries_dir));
    for entry in &manifest.repositories {
        resolver.add_repository(entry.to_descriptor()?);
    }
    for entry in &manifest.libraries {
        resolver.add_dependency(entry.to_declaration()?);
    }

    let mut store = PathStore::new();
    resolver.register(&mut store).await.with_context(|| {
        format!(
            "failed to resolve libraries declared in {}",
            manifest_path.display()
        )
    })?;

    for path in store.paths() {
        println!("{}", path.display());
    }
    Ok(())
}
