//! Host runtime detection.
//!
//! A resolver can run standalone or inside a Spin host process that embeds
//! the plugin loader. The Spin host links its own transport components, so
//! resolution needs to know which situation it is in, and only learns it
//! at runtime by probing the process's loaded-code inventory.

use std::fmt;

/// Shared object the Spin host maps into any process embedding it.
const SPIN_ENGINE_OBJECT: &str = "libspin_engine";

/// The hosting environment a resolution run executes under.
///
/// Computed once per registration run and passed by value into the
/// compatibility filter; never re-probed mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostProfile {
    /// No embedding runtime detected. Every artifact is acceptable.
    Standalone,
    /// Running inside a Spin host process, which bundles its own
    /// network-I/O components.
    SpinEmbedded,
}

impl HostProfile {
    /// Probe the current process.
    ///
    /// A pure presence check against the loaded-code inventory. Any probe
    /// failure (unreadable inventory, non-Linux platform, marker absent)
    /// reads as [`HostProfile::Standalone`]; detection never errors and
    /// never aborts a resolution.
    pub fn detect() -> Self {
        match std::fs::read_to_string("/proc/self/maps") {
            Ok(maps) => Self::from_loaded_objects(&maps),
            Err(_) => HostProfile::Standalone,
        }
    }

    fn from_loaded_objects(maps: &str) -> Self {
        if maps.lines().any(|line| line.contains(SPIN_ENGINE_OBJECT)) {
            HostProfile::SpinEmbedded
        } else {
            HostProfile::Standalone
        }
    }
}

impl fmt::Display for HostProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostProfile::Standalone => write!(f, "standalone"),
            HostProfile::SpinEmbedded => write!(f, "spin-embedded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inventory_is_standalone() {
        assert_eq!(
            HostProfile::from_loaded_objects(""),
            HostProfile::Standalone
        );
    }

    #[test]
    fn test_unrelated_objects_are_standalone() {
        let maps = "7f0000000000-7f0000001000 r-xp 00000000 08:01 1 /usr/lib/libc.so.6\n\
                    7f0000002000-7f0000003000 r-xp 00000000 08:01 2 /usr/lib/libssl.so.3\n";
        assert_eq!(
            HostProfile::from_loaded_objects(maps),
            HostProfile::Standalone
        );
    }

    #[test]
    fn test_spin_engine_object_is_detected() {
        let maps = "7f0000000000-7f0000001000 r-xp 00000000 08:01 1 /usr/lib/libc.so.6\n\
                    7f0000004000-7f0000005000 r-xp 00000000 08:01 3 /opt/spin/libspin_engine.so\n";
        assert_eq!(
            HostProfile::from_loaded_objects(maps),
            HostProfile::SpinEmbedded
        );
    }

    #[test]
    fn test_detect_never_panics() {
        // Whatever the machine running the tests looks like, detection must
        // produce a profile rather than an error.
        let _ = HostProfile::detect();
    }
}
