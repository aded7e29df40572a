//! Session configuration for one `collect` call.
//!
//! A config struct loaded from a TOML/JSON file with per-field defaults:
//! every field has a `#[serde(default = "...")]` and a matching free
//! function, so a partial config document still produces sane values for
//! anything it omits.

use serde::{Deserialize, Serialize};

/// Options recognised by the collector, keyed as `aether.*`-style session
/// properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectSession {
    /// `aether.dependencyCollector.maxExceptions` — caps recorded errors.
    #[serde(default = "default_max_exceptions")]
    pub max_exceptions: usize,

    /// `aether.dependencyCollector.maxCycles` — caps recorded cycles.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,

    /// `aether.dependencyCollector.bf.skipper` — enables the resolution
    /// skipper; `false` always re-expands.
    #[serde(default = "default_skipper_enabled")]
    pub skipper_enabled: bool,

    /// `aether.dependencyManager.verbose` — stamps the premanaged snapshot
    /// onto resolved nodes.
    #[serde(default)]
    pub verbose_management: bool,

    /// `ignoreArtifactDescriptorRepositories` — suppresses descriptor-
    /// declared repositories during aggregation.
    #[serde(default)]
    pub ignore_descriptor_repositories: bool,
}

impl Default for CollectSession {
    fn default() -> Self {
        Self {
            max_exceptions: default_max_exceptions(),
            max_cycles: default_max_cycles(),
            skipper_enabled: default_skipper_enabled(),
            verbose_management: false,
            ignore_descriptor_repositories: false,
        }
    }
}

fn default_max_exceptions() -> usize {
    50
}

fn default_max_cycles() -> usize {
    10
}

fn default_skipper_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let session = CollectSession::default();
        assert_eq!(session.max_exceptions, 50);
        assert_eq!(session.max_cycles, 10);
        assert!(session.skipper_enabled);
        assert!(!session.verbose_management);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let session: CollectSession = serde_json::from_str(r#"{"max_exceptions": 5}"#).unwrap();
        assert_eq!(session.max_exceptions, 5);
        assert_eq!(session.max_cycles, 10);
    }
}
