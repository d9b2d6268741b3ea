//! Runtime-conditional artifact filtering.

use crate::coordinate::PackageCoordinate;
use crate::host::HostProfile;

/// Packages the Spin host provides natively. Pulling registry copies of
/// these alongside the host's bundled network-I/O stack breaks transport
/// linking, so they are excluded whenever the embedded profile is active.
const SPIN_BUNDLED_PACKAGES: [&str; 2] = ["http-transport", "http-client"];

/// Per-run predicate deciding which graph nodes may be resolved.
///
/// Holds the host profile fixed for the lifetime of one resolution run:
/// the engine consults `accept` for every node of the traversal, and every
/// consultation sees the same detection result.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityFilter {
    profile: HostProfile,
}

impl CompatibilityFilter {
    pub fn new(profile: HostProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> HostProfile {
        self.profile
    }

    /// Reject a node iff the embedded profile is active and the package
    /// name is one of the host-bundled set. Everything else is accepted.
    pub fn accept(&self, coordinate: &PackageCoordinate) -> bool {
        let accept = match self.profile {
            HostProfile::Standalone => true,
            HostProfile::SpinEmbedded => !SPIN_BUNDLED_PACKAGES.contains(&coordinate.name()),
        };
        if !accept {
            tracing::debug!("ignoring {coordinate}: incompatible with the {} host", self.profile);
        }
        accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(spec: &str) -> PackageCoordinate {
        PackageCoordinate::parse(spec).unwrap()
    }

    #[test]
    fn test_standalone_accepts_everything() {
        let filter = CompatibilityFilter::new(HostProfile::Standalone);
        assert!(filter.accept(&coord("wasmcp:http-transport")));
        assert!(filter.accept(&coord("wasmcp:http-client")));
        assert!(filter.accept(&coord("acme:widgets")));
    }

    #[test]
    fn test_embedded_rejects_bundled_packages() {
        let filter = CompatibilityFilter::new(HostProfile::SpinEmbedded);
        assert!(!filter.accept(&coord("wasmcp:http-transport")));
        assert!(!filter.accept(&coord("wasmcp:http-client")));
    }

    #[test]
    fn test_embedded_rejects_bundled_names_in_any_namespace() {
        let filter = CompatibilityFilter::new(HostProfile::SpinEmbedded);
        assert!(!filter.accept(&coord("acme:http-transport")));
    }

    #[test]
    fn test_embedded_accepts_everything_else() {
        let filter = CompatibilityFilter::new(HostProfile::SpinEmbedded);
        assert!(filter.accept(&coord("acme:widgets")));
        assert!(filter.accept(&coord("wasmcp:calculator")));
    }
}
