//! The per-resolution data pool: interning plus the three memoisation
//! caches that make repeated identical work in a large graph cheap. One
//! pool is created per `collect` call and discarded with it.

use std::collections::HashMap;
use std::sync::Arc;

use resolvent_model::{Artifact, Dependency, NodeId, VersionlessKey};

use crate::collaborators::{ArtifactDescriptorResult, VersionRangeResult};

fn repo_ids(repositories: &[resolvent_model::RemoteRepository]) -> Vec<String> {
    repositories.iter().map(|r| r.id.clone()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VersionRangeKey {
    group_id: String,
    artifact_id: String,
    classifier: String,
    extension: String,
    repo_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DescriptorKey {
    artifact: Artifact,
    repo_ids: Vec<String>,
}

/// A prior descriptor-read failure, cached so the collector never retries
/// the same (artifact, repositories) pair twice.
#[derive(Debug, Clone)]
enum DescriptorCacheEntry {
    Present(ArtifactDescriptorResult),
    NoDescriptor,
}

/// Key for the child-subgraph cache: the exact resolved parent artifact,
/// the repository list its children would be expanded against, and a
/// value-fingerprint of the four policy objects in effect. Any policy that
/// cannot produce a fingerprint (`cache_key` returns `None`) disables
/// caching for that node entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildrenKey {
    parent_artifact: Artifact,
    repo_ids: Vec<String>,
    selector_key: String,
    manager_key: String,
    traverser_key: String,
    filter_key: String,
}

impl ChildrenKey {
    /// Returns `None` if any policy in effect is not value-comparable.
    pub fn build(
        parent_artifact: &Artifact,
        repositories: &[resolvent_model::RemoteRepository],
        selector: &dyn crate::policy::DependencySelector,
        manager: &dyn crate::policy::DependencyManager,
        traverser: &dyn crate::policy::DependencyTraverser,
        filter: &dyn crate::policy::VersionFilter,
    ) -> Option<Self> {
        Some(Self {
            parent_artifact: parent_artifact.clone(),
            repo_ids: repo_ids(repositories),
            selector_key: selector.cache_key()?,
            manager_key: manager.cache_key()?,
            traverser_key: traverser.cache_key()?,
            filter_key: filter.cache_key()?,
        })
    }
}

/// Per-resolution interning and memoisation.
#[derive(Debug, Default)]
pub struct DataPool {
    artifacts: HashMap<Artifact, Arc<Artifact>>,
    dependencies: HashMap<Dependency, Arc<Dependency>>,
    version_ranges: HashMap<VersionRangeKey, VersionRangeResult>,
    descriptors: HashMap<DescriptorKey, DescriptorCacheEntry>,
    children: HashMap<ChildrenKey, Vec<NodeId>>,
}

impl DataPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalise an artifact: the first instance of a given coordinate
    /// wins and is handed back for every later lookup.
    pub fn intern_artifact(&mut self, artifact: Artifact) -> Arc<Artifact> {
        if let Some(existing) = self.artifacts.get(&artifact) {
            return existing.clone();
        }
        let handle = Arc::new(artifact.clone());
        self.artifacts.insert(artifact, handle.clone());
        handle
    }

    /// Canonicalise a dependency, first canonicalising its embedded
    /// artifact so the two caches always agree on one coordinate handle.
    pub fn intern_dependency(&mut self, dependency: Dependency) -> Arc<Dependency> {
        if let Some(existing) = self.dependencies.get(&dependency) {
            return existing.clone();
        }
        let artifact = self.intern_artifact(dependency.artifact.clone());
        let canonical = dependency.with_artifact((*artifact).clone());
        let handle = Arc::new(canonical.clone());
        self.dependencies.insert(canonical, handle.clone());
        handle
    }

    fn version_range_key(artifact: &Artifact, repositories: &[resolvent_model::RemoteRepository]) -> VersionRangeKey {
        VersionRangeKey {
            group_id: artifact.group_id.clone(),
            artifact_id: artifact.artifact_id.clone(),
            classifier: artifact.classifier.clone(),
            extension: artifact.extension.clone(),
            repo_ids: repo_ids(repositories),
        }
    }

    pub fn get_version_range(
        &self,
        artifact: &Artifact,
        repositories: &[resolvent_model::RemoteRepository],
    ) -> Option<&VersionRangeResult> {
        self.version_ranges.get(&Self::version_range_key(artifact, repositories))
    }

    pub fn put_version_range(
        &mut self,
        artifact: &Artifact,
        repositories: &[resolvent_model::RemoteRepository],
        result: VersionRangeResult,
    ) {
        self.version_ranges.insert(Self::version_range_key(artifact, repositories), result);
    }

    fn descriptor_key(artifact: &Artifact, repositories: &[resolvent_model::RemoteRepository]) -> DescriptorKey {
        DescriptorKey {
            artifact: artifact.clone(),
            repo_ids: repo_ids(repositories),
        }
    }

    /// `Some(Ok(_))` — cached success. `Some(Err(()))` — cached
    /// `NO_DESCRIPTOR` sentinel, do not retry. `None` — not yet attempted.
    pub fn get_descriptor(
        &self,
        artifact: &Artifact,
        repositories: &[resolvent_model::RemoteRepository],
    ) -> Option<Result<&ArtifactDescriptorResult, ()>> {
        match self.descriptors.get(&Self::descriptor_key(artifact, repositories))? {
            DescriptorCacheEntry::Present(result) => Some(Ok(result)),
            DescriptorCacheEntry::NoDescriptor => Some(Err(())),
        }
    }

    pub fn put_descriptor(
        &mut self,
        artifact: &Artifact,
        repositories: &[resolvent_model::RemoteRepository],
        result: ArtifactDescriptorResult,
    ) {
        self.descriptors
            .insert(Self::descriptor_key(artifact, repositories), DescriptorCacheEntry::Present(result));
    }

    pub fn put_no_descriptor(&mut self, artifact: &Artifact, repositories: &[resolvent_model::RemoteRepository]) {
        self.descriptors
            .insert(Self::descriptor_key(artifact, repositories), DescriptorCacheEntry::NoDescriptor);
    }

    /// The already-built child node ids for `key`, if this exact
    /// (artifact, repositories, policy fingerprint) combination was already
    /// expanded elsewhere in this resolution. Splicing these under a new
    /// parent is safe because the arena lets multiple nodes share children
    /// by id without duplicating them.
    pub fn get_children(&self, key: &ChildrenKey) -> Option<&Vec<NodeId>> {
        self.children.get(key)
    }

    pub fn put_children(&mut self, key: ChildrenKey, children: Vec<NodeId>) {
        self.children.insert(key, children);
    }

    /// Drops every child-subgraph cache entry expanded for `identity`
    /// (any version), used when the resolution skipper force-displaces a
    /// winner: the subtree cached under the old winner's artifact no longer
    /// reflects the identity now in force and must be rebuilt.
    pub fn invalidate_children_for(&mut self, identity: &VersionlessKey) {
        self.children.retain(|key, _| key.parent_artifact.versionless() != *identity);
    }
}
