//! Trait contracts for the collector's external collaborators: descriptor
//! reading, version-range resolution, and remote-repository aggregation.
//! No Maven-format implementation lives here — see `resolvent-descriptor`
//! for that — this module only fixes the shapes the collector calls
//! against.

use resolvent_model::{Artifact, Dependency, RemoteRepository};

use crate::error::CollectError;

/// A request to read an artifact descriptor (its POM, in Maven terms).
#[derive(Debug, Clone)]
pub struct DescriptorRequest {
    pub artifact: Artifact,
    pub repositories: Vec<RemoteRepository>,
    pub request_context: String,
}

/// The descriptor for one artifact: its declared and managed dependencies,
/// any relocation chain already resolved by the reader, and the
/// repositories it declares.
///
/// `artifact` carries the *effective* coordinate — if the descriptor
/// relocates, this is the relocation target, and `relocations` lists the
/// coordinates that were relocated away from, oldest first.
#[derive(Debug, Clone)]
pub struct ArtifactDescriptorResult {
    pub artifact: Artifact,
    pub relocations: Vec<Artifact>,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
    pub repositories: Vec<RemoteRepository>,
    pub aliases: Vec<Artifact>,
}

impl ArtifactDescriptorResult {
    /// The stand-in used when an artifact has no real descriptor to read
    /// (system scope) or a prior read attempt failed.
    pub fn empty(artifact: Artifact) -> Self {
        Self {
            artifact,
            relocations: Vec::new(),
            dependencies: Vec::new(),
            managed_dependencies: Vec::new(),
            repositories: Vec::new(),
            aliases: Vec::new(),
        }
    }
}

pub trait DescriptorReader {
    fn read(&self, request: &DescriptorRequest) -> Result<ArtifactDescriptorResult, CollectError>;
}

/// A request to resolve a version range (or pin a single version) for an
/// artifact coordinate.
#[derive(Debug, Clone)]
pub struct VersionRangeRequest {
    /// `artifact.version` holds the range expression, e.g. `[1.0,2.0)`, or a
    /// plain version when no range syntax is present.
    pub artifact: Artifact,
    pub repositories: Vec<RemoteRepository>,
    pub request_context: String,
}

/// The ascending list of versions satisfying a range, plus the constraint
/// string it was resolved from and (optionally) which repository served
/// each version.
#[derive(Debug, Clone, Default)]
pub struct VersionRangeResult {
    pub versions: Vec<String>,
    pub constraint: String,
    pub repository_per_version: std::collections::HashMap<String, RemoteRepository>,
}

pub trait VersionRangeResolver {
    fn resolve(&self, request: &VersionRangeRequest) -> Result<VersionRangeResult, CollectError>;
}

/// Merges two repository lists: `dominant` wins on id
/// collision. `recessive_is_raw` distinguishes merging a descriptor's
/// freshly-declared repositories (`true`) from merging an already-derived
/// child repository list (`false`) — real aggregators apply mirror/auth
/// policy only to raw descriptor repositories.
pub trait RemoteRepositoryManager {
    fn aggregate(
        &self,
        dominant: &[RemoteRepository],
        recessive: &[RemoteRepository],
        recessive_is_raw: bool,
    ) -> Vec<RemoteRepository>;
}
