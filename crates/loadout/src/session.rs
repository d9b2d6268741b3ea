//! Resolution session policy.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory used as the local artifact store when the caller does not
/// pick one, relative to the process working directory.
pub const DEFAULT_LIBRARIES_DIR: &str = "libraries";

/// How digest mismatches are treated during artifact materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// A mismatch aborts resolution of the artifact, and with it the run.
    Strict,
    /// A mismatch is logged and the artifact accepted anyway.
    Lenient,
}

/// Observability hook invoked when an artifact transfer starts, with the
/// repository endpoint and the resource being fetched. Has no effect on
/// the resolution outcome.
pub type TransferHook = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Cross-cutting policy shared by every resolution a resolver performs.
///
/// Pinned at construction: digest verification strictness, the local cache
/// directory keyed by coordinate, and the transfer hook never drift between
/// runs of the same resolver. All fields are private and only readable
/// afterwards.
#[derive(Clone)]
pub struct ResolverSession {
    libraries_dir: PathBuf,
    checksum_policy: ChecksumPolicy,
    on_transfer: TransferHook,
}

impl ResolverSession {
    /// Create a session storing artifacts under `libraries_dir` with strict
    /// digest verification and a logging transfer hook.
    pub fn new(libraries_dir: impl Into<PathBuf>) -> Self {
        Self {
            libraries_dir: libraries_dir.into(),
            checksum_policy: ChecksumPolicy::Strict,
            on_transfer: Arc::new(|origin, resource| {
                tracing::info!("Downloading {origin}/{resource}");
            }),
        }
    }

    /// Replace the transfer hook. Part of session setup; once the session
    /// is handed to a resolver nothing can change it.
    pub fn with_transfer_hook(mut self, hook: TransferHook) -> Self {
        self.on_transfer = hook;
        self
    }

    pub fn libraries_dir(&self) -> &Path {
        &self.libraries_dir
    }

    pub fn checksum_policy(&self) -> ChecksumPolicy {
        self.checksum_policy
    }

    pub(crate) fn notify_transfer(&self, origin: &str, resource: &str) {
        (self.on_transfer)(origin, resource);
    }
}

impl fmt::Debug for ResolverSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverSession")
            .field("libraries_dir", &self.libraries_dir)
            .field("checksum_policy", &self.checksum_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_session_defaults_to_strict_checksums() {
        let session = ResolverSession::new("libraries");
        assert_eq!(session.checksum_policy(), ChecksumPolicy::Strict);
        assert_eq!(session.libraries_dir(), Path::new("libraries"));
    }

    #[test]
    fn test_transfer_hook_observes_transfers() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = seen.clone();
        let session = ResolverSession::new("libraries").with_transfer_hook(Arc::new(
            move |origin, resource| {
                sink.lock().unwrap().push(format!("{origin}/{resource}"));
            },
        ));

        session.notify_transfer("ghcr.io", "acme/widgets@1.0.0");
        session.notify_transfer("ghcr.io", "acme/gadgets@2.0.0");

        assert_eq!(
            *seen.lock().unwrap(),
            ["ghcr.io/acme/widgets@1.0.0", "ghcr.io/acme/gadgets@2.0.0"]
        );
    }
}
