//! The resolution skipper: avoids re-expanding a subtree
//! the breadth-first collector has already settled, either because it is
//! an exact repeat or because a shallower winner has already been chosen
//! for the same versionless identity.

use std::collections::HashMap;

use resolvent_model::{Artifact, VersionlessKey};

/// What the collector should do with a candidate dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDecision {
    Proceed,
    SkipDuplicate,
    SkipVersionConflict,
}

#[derive(Debug, Clone)]
struct WinnerRecord {
    version: String,
    depth: usize,
}

/// Tracks, per versionless identity, the parent paths already expanded and
/// the current depth/version winner.
#[derive(Debug, Default)]
pub struct ResolutionSkipper {
    enabled: bool,
    occurrences: HashMap<Artifact, Vec<Vec<VersionlessKey>>>,
    winners: HashMap<VersionlessKey, WinnerRecord>,
    /// Identities whose winner was just force-displaced and whose cached
    /// child subgraph is therefore stale, drained by `drain_invalidations`.
    pending_invalidations: Vec<VersionlessKey>,
}

impl ResolutionSkipper {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            occurrences: HashMap::new(),
            winners: HashMap::new(),
            pending_invalidations: Vec::new(),
        }
    }

    /// Consult the skipper before enqueuing a candidate's children,
    /// recording the occurrence and any new winner as a side effect.
    /// `path` is the ancestor chain's versionless identities (shallowest
    /// first), not including the candidate itself; `depth` is the queue
    /// depth (root's direct children are depth 1).
    pub fn decide_and_record(&mut self, artifact: &Artifact, path: &[VersionlessKey], depth: usize) -> SkipDecision {
        if !self.enabled {
            return SkipDecision::Proceed;
        }

        let seen_paths = self.occurrences.entry(artifact.clone()).or_default();
        if seen_paths.iter().any(|seen| is_prefix(seen, path)) {
            return SkipDecision::SkipDuplicate;
        }

        let identity = artifact.versionless();
        if let Some(winner) = self.winners.get(&identity) {
            if winner.depth < depth && winner.version != artifact.version {
                return SkipDecision::SkipVersionConflict;
            }
        }

        seen_paths.push(path.to_vec());

        let mut displaced_a_different_version = false;
        self.winners
            .entry(identity.clone())
            .and_modify(|w| {
                // Force resolution: an equal-or-shallower occurrence always
                // displaces the prior winner, even if versions match.
                if depth <= w.depth {
                    if w.version != artifact.version {
                        displaced_a_different_version = true;
                    }
                    w.version = artifact.version.clone();
                    w.depth = depth;
                }
            })
            .or_insert(WinnerRecord {
                version: artifact.version.clone(),
                depth,
            });

        if displaced_a_different_version {
            self.pending_invalidations.push(identity);
        }

        SkipDecision::Proceed
    }

    /// Drains the identities queued by `decide_and_record`'s force-resolution
    /// branch: a prior winner was just displaced by an equal-or-shallower
    /// occurrence of a different version, so any child-subgraph cache entry
    /// keyed to the old winner's artifact is stale and must be thrown away
    /// before the tree is re-expanded under the new winner.
    pub fn drain_invalidations(&mut self) -> Vec<VersionlessKey> {
        std::mem::take(&mut self.pending_invalidations)
    }

    /// Consult again right before caching a node's child subgraph in the
    /// data pool: if a sibling displaced this identity's winner since
    /// `decide_and_record` ran, the subtree must not be memoised as if it
    /// were still authoritative.
    pub fn is_current_winner(&self, artifact: &Artifact, depth: usize) -> bool {
        if !self.enabled {
            return true;
        }
        match self.winners.get(&artifact.versionless()) {
            Some(winner) => winner.version == artifact.version && winner.depth == depth,
            None => true,
        }
    }
}

fn is_prefix(shorter: &[VersionlessKey], longer: &[VersionlessKey]) -> bool {
    shorter.len() <= longer.len() && shorter.iter().zip(longer.iter()).all(|(a, b)| a == b)
}
