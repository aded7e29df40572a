//! Maven-format implementations of the collection engine's three
//! collaborator traits: reading a descriptor (a POM), resolving a version
//! range against `maven-metadata.xml`, and aggregating repository lists.
//!
//! Fetching the documents these implementations parse is left to the
//! embedder via [`MavenDocumentSource`] — this crate only ever sees XML
//! already in memory.

use std::collections::HashMap;

use resolvent_collector::{
    ArtifactDescriptorResult, CollectError, DescriptorReader, DescriptorRequest, RemoteRepositoryManager,
    VersionRangeRequest, VersionRangeResolver, VersionRangeResult,
};
use resolvent_model::{Artifact, Dependency, Exclusion, RemoteRepository};

use crate::pom::{parse_pom, Pom, PomDependency};
use crate::version::{MavenVersion, VersionRange};

/// Supplies the raw documents a Maven-format reader needs: the POM for a
/// concrete coordinate, and the `maven-metadata.xml` for a group:artifact.
/// How those bytes are obtained — HTTP, a local cache, a test fixture — is
/// entirely the implementor's concern; `None` means "nothing available"
/// and is reported to the collector as a descriptor/version-range failure.
pub trait MavenDocumentSource {
    fn fetch_pom(&self, artifact: &Artifact, repositories: &[RemoteRepository]) -> Option<String>;
    fn fetch_metadata(&self, group_id: &str, artifact_id: &str, repositories: &[RemoteRepository]) -> Option<String>;
}

/// Reads POMs through a [`MavenDocumentSource`] and turns them into
/// [`ArtifactDescriptorResult`]s, following one relocation hop per call —
/// the engine itself drives the tail-call loop for chained relocations.
pub struct MavenDescriptorReader<S> {
    source: S,
}

impl<S: MavenDocumentSource> MavenDescriptorReader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: MavenDocumentSource> DescriptorReader for MavenDescriptorReader<S> {
    fn read(&self, request: &DescriptorRequest) -> Result<ArtifactDescriptorResult, CollectError> {
        let xml = self
            .source
            .fetch_pom(&request.artifact, &request.repositories)
            .ok_or_else(|| {
                tracing::warn!("no POM available for {}", request.artifact);
                CollectError::DescriptorRead {
                    coordinate: request.artifact.to_string(),
                    message: "no POM available for this coordinate".to_string(),
                }
            })?;

        let mut pom = parse_pom(&xml).map_err(|e| CollectError::DescriptorRead {
            coordinate: request.artifact.to_string(),
            message: e.to_string(),
        })?;
        pom.resolve_properties();

        if let Some((group_id, artifact_id, version)) = pom.effective_relocation() {
            let moved = group_id != request.artifact.group_id
                || artifact_id != request.artifact.artifact_id
                || version != request.artifact.version;
            if moved {
                let relocated = Artifact {
                    group_id,
                    artifact_id,
                    version,
                    ..request.artifact.clone()
                };
                tracing::debug!("{} relocated to {relocated}", request.artifact);
                return Ok(ArtifactDescriptorResult {
                    artifact: relocated,
                    relocations: vec![request.artifact.clone()],
                    dependencies: Vec::new(),
                    managed_dependencies: Vec::new(),
                    repositories: pom_repositories(&pom),
                    aliases: Vec::new(),
                });
            }
        }

        Ok(ArtifactDescriptorResult {
            artifact: request.artifact.clone(),
            relocations: Vec::new(),
            dependencies: pom.dependencies.iter().map(to_dependency).collect(),
            managed_dependencies: pom.dependency_management.iter().map(to_dependency).collect(),
            repositories: pom_repositories(&pom),
            aliases: Vec::new(),
        })
    }
}

fn to_dependency(dep: &PomDependency) -> Dependency {
    let artifact = Artifact {
        group_id: dep.group_id.clone(),
        artifact_id: dep.artifact_id.clone(),
        classifier: dep.classifier.clone().unwrap_or_default(),
        extension: dep.type_.clone().unwrap_or_else(|| "jar".to_string()),
        version: dep.version.clone().unwrap_or_default(),
        properties: Default::default(),
    };
    let mut dependency = Dependency::new(artifact, dep.scope.clone().unwrap_or_else(|| "compile".to_string()));
    dependency.optional = dep.optional;
    dependency.exclusions = dep
        .exclusions
        .iter()
        .map(|e| Exclusion {
            group_id: e.group_id.clone(),
            artifact_id: e.artifact_id.clone().unwrap_or_else(|| "*".to_string()),
            classifier: "*".to_string(),
            extension: "*".to_string(),
        })
        .collect();
    dependency
}

fn pom_repositories(pom: &Pom) -> Vec<RemoteRepository> {
    pom.repositories.iter().map(|r| RemoteRepository::new(r.id.clone(), r.url.clone())).collect()
}

/// Resolves a version range (or passes through a plain version) against
/// `maven-metadata.xml`'s listed versions.
pub struct MavenVersionRangeResolver<S> {
    source: S,
}

impl<S: MavenDocumentSource> MavenVersionRangeResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: MavenDocumentSource> VersionRangeResolver for MavenVersionRangeResolver<S> {
    fn resolve(&self, request: &VersionRangeRequest) -> Result<VersionRangeResult, CollectError> {
        let constraint = request.artifact.version.clone();

        let Some(range) = VersionRange::parse(&constraint) else {
            return Ok(VersionRangeResult {
                versions: vec![constraint.clone()],
                constraint,
                repository_per_version: HashMap::new(),
            });
        };

        let xml = self
            .source
            .fetch_metadata(&request.artifact.group_id, &request.artifact.artifact_id, &request.repositories)
            .ok_or_else(|| CollectError::VersionRangeResolution {
                coordinate: request.artifact.to_string(),
                message: "no maven-metadata.xml available for this range".to_string(),
            })?;

        let metadata = crate::metadata::parse_metadata(&xml).map_err(|e| CollectError::VersionRangeResolution {
            coordinate: request.artifact.to_string(),
            message: e.to_string(),
        })?;

        let mut matching: Vec<MavenVersion> = metadata
            .versions
            .iter()
            .map(|v| MavenVersion::parse(v))
            .filter(|v| range.contains(v))
            .collect();
        matching.sort();

        Ok(VersionRangeResult {
            versions: matching.into_iter().map(|v| v.original).collect(),
            constraint,
            repository_per_version: HashMap::new(),
        })
    }
}

/// Merges two repository lists by id, `dominant` winning on collision.
/// `recessive_is_raw` is unused here: this implementation treats a
/// descriptor's freshly declared repositories the same as an
/// already-derived child list, since Maven Central layout carries no
/// mirror/auth policy to apply selectively.
#[derive(Debug, Default, Clone, Copy)]
pub struct MavenRepositoryManager;

impl RemoteRepositoryManager for MavenRepositoryManager {
    fn aggregate(&self, dominant: &[RemoteRepository], recessive: &[RemoteRepository], _recessive_is_raw: bool) -> Vec<RemoteRepository> {
        let mut merged = dominant.to_vec();
        let known: std::collections::HashSet<&str> = dominant.iter().map(|r| r.id.as_str()).collect();
        for repo in recessive {
            if !known.contains(repo.id.as_str()) {
                merged.push(repo.clone());
            }
        }
        merged
    }
}
