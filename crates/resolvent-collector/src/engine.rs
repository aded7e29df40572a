//! The breadth-first collector: the driver that loops over a work queue,
//! resolves versions and descriptors through the data pool, applies
//! dependency management, and assembles the result graph.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use resolvent_model::{Artifact, CollectSession, Dependency, NodeData, NodeId, RemoteRepository, VersionlessKey};

use crate::collaborators::{
    ArtifactDescriptorResult, DescriptorReader, DescriptorRequest, RemoteRepositoryManager, VersionRangeRequest,
    VersionRangeResolver,
};
use crate::cycle::{detect_cycle, CycleRecord};
use crate::error::CollectError;
use crate::graph::DependencyGraph;
use crate::management::apply_management;
use crate::policy::{DependencyManager, DependencySelector, DependencyTraverser, DeriveContext, VersionFilter};
use crate::pool::{ChildrenKey, DataPool};
use crate::result::{CollectRequest, CollectResult, RecordedException};
use crate::skipper::{ResolutionSkipper, SkipDecision};
use crate::transform::{DependencyGraphTransformer, TransformContext};

/// The depth-derivable policy set in effect at one queue item.
#[derive(Clone)]
pub struct Policies {
    pub selector: Arc<dyn DependencySelector>,
    pub manager: Arc<dyn DependencyManager>,
    pub traverser: Arc<dyn DependencyTraverser>,
    pub filter: Arc<dyn VersionFilter>,
}

impl Policies {
    fn derive_child(&self, dependency: &Dependency, depth: usize) -> Self {
        let ctx = DeriveContext { dependency, depth };
        Self {
            selector: self.selector.derive_child(&ctx),
            manager: self.manager.derive_child(&ctx),
            traverser: self.traverser.derive_child(&ctx),
            filter: self.filter.derive_child(&ctx),
        }
    }
}

/// The three external collaborators the collector calls against.
pub struct Collaborators<'a> {
    pub descriptor_reader: &'a dyn DescriptorReader,
    pub version_resolver: &'a dyn VersionRangeResolver,
    pub repository_manager: &'a dyn RemoteRepositoryManager,
}

/// One queued unit of work: a candidate dependency plus the policy/
/// repository/management state in effect at its depth, and the ordered
/// parent chain it would hang off of.
#[derive(Clone)]
struct ProcessingContext {
    policies: Policies,
    repositories: Vec<RemoteRepository>,
    managed_dependencies: Vec<Dependency>,
    parents: Vec<NodeId>,
    dependency: Dependency,
    depth: usize,
    /// A pre-allocated node id to fill in, when this item was enqueued as
    /// part of an already-spliceable children group; `None` for root-level
    /// direct dependencies, which are never memoised.
    target: Option<NodeId>,
}

struct CollectState<'a> {
    session: &'a CollectSession,
    collaborators: Collaborators<'a>,
    pool: DataPool,
    skipper: ResolutionSkipper,
    graph: DependencyGraph,
    exceptions: Vec<RecordedException>,
    cycles: Vec<CycleRecord>,
    queue: VecDeque<ProcessingContext>,
    request_context: String,
}

impl<'a> CollectState<'a> {
    fn record_exception(&mut self, parents: &[NodeId], coordinate: &str, message: impl Into<String>) {
        if self.exceptions.len() >= self.session.max_exceptions {
            return;
        }
        let mut trail: Vec<String> = parents
            .iter()
            .filter_map(|&id| self.graph.node(id).dependency.as_ref().map(|d| d.artifact.to_string()))
            .collect();
        trail.push(coordinate.to_string());
        let error_path = trail.join(" -> ");
        let message = message.into();
        tracing::warn!("{message} ({error_path})");
        self.exceptions.push(RecordedException { message, error_path });
    }

    fn record_cycle(&mut self, path: Vec<String>, target: String) {
        if self.cycles.len() < self.session.max_cycles {
            tracing::debug!("cycle detected: {} -> {target}", path.join(" -> "));
            self.cycles.push(CycleRecord { path, target });
        }
    }

    fn resolve_version_range(
        &mut self,
        artifact: &Artifact,
        repositories: &[RemoteRepository],
    ) -> Result<crate::collaborators::VersionRangeResult, CollectError> {
        if let Some(cached) = self.pool.get_version_range(artifact, repositories) {
            return Ok(cached.clone());
        }
        let request = VersionRangeRequest {
            artifact: artifact.clone(),
            repositories: repositories.to_vec(),
            request_context: self.request_context.clone(),
        };
        let result = self.collaborators.version_resolver.resolve(&request)?;
        self.pool.put_version_range(artifact, repositories, result.clone());
        Ok(result)
    }

    fn read_descriptor(
        &mut self,
        artifact: &Artifact,
        repositories: &[RemoteRepository],
    ) -> Result<ArtifactDescriptorResult, ()> {
        if let Some(cached) = self.pool.get_descriptor(artifact, repositories) {
            return cached.map(|descriptor| descriptor.clone());
        }
        let request = DescriptorRequest {
            artifact: artifact.clone(),
            repositories: repositories.to_vec(),
            request_context: self.request_context.clone(),
        };
        match self.collaborators.descriptor_reader.read(&request) {
            Ok(descriptor) => {
                self.pool.put_descriptor(artifact, repositories, descriptor.clone());
                Ok(descriptor)
            }
            Err(_) => {
                self.pool.put_no_descriptor(artifact, repositories);
                Err(())
            }
        }
    }
}

/// A dependency with `system` scope names a local artifact with no
/// descriptor to follow.
fn has_descriptor_capability(dependency: &Dependency) -> bool {
    dependency.scope != "system"
}

/// Merges two dependency lists by versionless identity, the first list's
/// entries winning any collision.
fn merge_request_wins(winning: &[Dependency], recessive: &[Dependency]) -> Vec<Dependency> {
    let winning_keys: HashSet<VersionlessKey> = winning.iter().map(|d| d.artifact.versionless()).collect();
    let mut merged = winning.to_vec();
    for dep in recessive {
        if !winning_keys.contains(&dep.artifact.versionless()) {
            merged.push(dep.clone());
        }
    }
    merged
}

fn parent_path(graph: &DependencyGraph, parents: &[NodeId]) -> Vec<VersionlessKey> {
    parents
        .iter()
        .filter_map(|&id| graph.node(id).dependency.as_ref().map(|d| d.artifact.versionless()))
        .collect()
}

/// Run the breadth-first collector.
pub fn collect(
    session: &CollectSession,
    request: &CollectRequest,
    collaborators: Collaborators<'_>,
    root_policies: Policies,
    transformer: Option<&dyn DependencyGraphTransformer>,
) -> Result<CollectResult, CollectError> {
    let mut state = CollectState {
        session,
        collaborators,
        pool: DataPool::new(),
        skipper: ResolutionSkipper::new(session.skipper_enabled),
        graph: DependencyGraph::new(),
        exceptions: Vec::new(),
        cycles: Vec::new(),
        queue: VecDeque::new(),
        request_context: request.request_context.clone(),
    };

    let (root_id, effective_dependencies, effective_managed, effective_repositories) =
        build_root(&mut state, request)?;

    for dependency in &effective_dependencies {
        state.queue.push_back(ProcessingContext {
            policies: root_policies.clone(),
            repositories: effective_repositories.clone(),
            managed_dependencies: effective_managed.clone(),
            parents: vec![root_id],
            dependency: dependency.clone(),
            depth: 1,
            target: None,
        });
    }

    while let Some(ctx) = state.queue.pop_front() {
        process_dependency(&mut state, ctx, Vec::new(), false);
    }

    if let Some(transformer) = transformer {
        let mut tctx = TransformContext::default();
        if let Err(message) = transformer.transform(&mut state.graph, root_id, &mut tctx) {
            state.exceptions.push(RecordedException {
                message: format!("graph transformation failed: {message}"),
                error_path: root_coordinate(&state.graph, root_id),
            });
        }
    }

    let result = CollectResult {
        graph: state.graph,
        root: root_id,
        exceptions: state.exceptions,
        cycles: state.cycles,
        request: request.clone(),
    };

    if let Some(first_error_path) = result.first_error_path().map(|s| s.to_string()) {
        Err(CollectError::Collection {
            partial: Box::new(result),
            first_error_path,
        })
    } else {
        Ok(result)
    }
}

fn root_coordinate(graph: &DependencyGraph, root_id: NodeId) -> String {
    graph
        .node(root_id)
        .dependency
        .as_ref()
        .map(|d| d.artifact.to_string())
        .unwrap_or_else(|| "<synthetic root>".to_string())
}

/// Builds the root node and returns the effective (dependencies, managed
/// dependencies, repositories) the main loop should seed its queue from.
fn build_root(
    state: &mut CollectState<'_>,
    request: &CollectRequest,
) -> Result<(NodeId, Vec<Dependency>, Vec<Dependency>, Vec<RemoteRepository>), CollectError> {
    if let Some(root_dependency) = &request.root_dependency {
        let range = state.resolve_version_range(&root_dependency.artifact, &request.repositories)?;
        let candidates = root_policies_filter(&range.versions, &root_dependency.artifact);
        let version = candidates
            .last()
            .cloned()
            .unwrap_or_else(|| root_dependency.artifact.version.clone());
        let artifact = root_dependency.artifact.with_version(version.clone());

        let descriptor = match state.read_descriptor(&artifact, &request.repositories) {
            Ok(descriptor) => descriptor,
            Err(()) => {
                state.record_exception(&[], &artifact.to_string(), "failed to read root descriptor");
                ArtifactDescriptorResult::empty(artifact.clone())
            }
        };

        let repositories = if state.session.ignore_descriptor_repositories {
            request.repositories.clone()
        } else {
            state
                .collaborators
                .repository_manager
                .aggregate(&request.repositories, &descriptor.repositories, true)
        };

        let effective_dependencies = merge_request_wins(&request.dependencies, &descriptor.dependencies);
        let effective_managed = merge_request_wins(&request.managed_dependencies, &descriptor.managed_dependencies);

        let root_dependency = root_dependency.with_artifact(artifact);
        let root_dependency = state.pool.intern_dependency(root_dependency);
        let mut node = NodeData::with_dependency(root_dependency, version);
        node.version_constraint = range.constraint;
        node.repositories = repositories.clone();
        node.request_context = request.request_context.clone();
        node.aliases = descriptor.aliases;
        node.relocations = descriptor.relocations;
        let root_id = state.graph.push(node);

        Ok((root_id, effective_dependencies, effective_managed, repositories))
    } else {
        let version = request
            .root_artifact
            .as_ref()
            .map(|a| a.version.clone())
            .unwrap_or_default();
        let mut node = NodeData::root(None, version);
        node.request_context = request.request_context.clone();
        let root_id = state.graph.push(node);
        Ok((
            root_id,
            request.dependencies.clone(),
            request.managed_dependencies.clone(),
            request.repositories.clone(),
        ))
    }
}

fn root_policies_filter(versions: &[String], artifact: &Artifact) -> Vec<String> {
    // The root's own version pick has no depth-derived filter yet (depth 0);
    // an implementation with a non-default root filter would thread one
    // through the session instead. Kept as a free function so it reads the
    // same way a per-node filter call would.
    let _ = artifact;
    versions.to_vec()
}

/// Resolves one candidate dependency: version range, descriptor, cycle and
/// skip checks, then places the node and queues its children.
fn process_dependency(
    state: &mut CollectState<'_>,
    ctx: ProcessingContext,
    relocations: Vec<Artifact>,
    disable_version_management: bool,
) {
    if !ctx.policies.selector.include(&ctx.dependency) {
        return;
    }

    let outcome = apply_management(
        ctx.policies.manager.as_ref(),
        &ctx.dependency,
        &ctx.managed_dependencies,
        disable_version_management,
        state.session.verbose_management,
    );
    let managed_dependency = outcome.dependency;

    let descriptor_capable = has_descriptor_capability(&managed_dependency);
    let traverser_allows = ctx.policies.traverser.traverse(&managed_dependency);

    let range = if descriptor_capable {
        match state.resolve_version_range(&managed_dependency.artifact, &ctx.repositories) {
            Ok(range) => range,
            Err(err) => {
                state.record_exception(&ctx.parents, &managed_dependency.artifact.to_string(), err.to_string());
                return;
            }
        }
    } else {
        crate::collaborators::VersionRangeResult {
            versions: vec![managed_dependency.artifact.version.clone()],
            constraint: managed_dependency.artifact.version.clone(),
            repository_per_version: Default::default(),
        }
    };

    let filtered = ctx.policies.filter.filter(&managed_dependency.artifact, range.versions.clone());
    let mut candidates = filtered;
    candidates.reverse();
    if candidates.is_empty() {
        return;
    }

    for (i, version) in candidates.iter().enumerate() {
        let candidate_artifact = managed_dependency.artifact.with_version(version.clone());
        let candidate_dependency = managed_dependency.with_artifact(candidate_artifact.clone());

        let descriptor = if !descriptor_capable {
            ArtifactDescriptorResult::empty(candidate_artifact.clone())
        } else {
            match state.read_descriptor(&candidate_artifact, &ctx.repositories) {
                Ok(descriptor) => descriptor,
                Err(()) => {
                    state.record_exception(
                        &ctx.parents,
                        &candidate_artifact.to_string(),
                        "failed to read artifact descriptor",
                    );
                    place_stub(state, &ctx, i, &candidate_dependency, &outcome.managed, &outcome.premanaged_data, &relocations);
                    continue;
                }
            }
        };

        if let Some(idx) = detect_cycle(&state.graph, &ctx.parents, &candidate_artifact) {
            let ancestor_id = ctx.parents[idx];
            if state.graph.node(ancestor_id).dependency.is_some() {
                let path: Vec<String> = ctx
                    .parents
                    .iter()
                    .filter_map(|&id| state.graph.node(id).dependency.as_ref().map(|d| d.artifact.to_string()))
                    .collect();
                state.record_cycle(path, candidate_artifact.to_string());
                place_cycle_terminus(
                    state,
                    &ctx,
                    i,
                    &candidate_dependency,
                    &range,
                    &outcome.managed,
                    &outcome.premanaged_data,
                    &relocations,
                    ancestor_id,
                );
                continue;
            }
            // Synthetic rootless root: fall through as an ordinary re-expansion.
        }

        if !descriptor.relocations.is_empty() {
            let relocated_artifact = descriptor.artifact.clone();
            let same_ga = relocated_artifact.group_id == candidate_dependency.artifact.group_id
                && relocated_artifact.artifact_id == candidate_dependency.artifact.artifact_id;
            let relocated_dependency = candidate_dependency.with_artifact(relocated_artifact);
            let mut next_relocations = relocations.clone();
            next_relocations.push(candidate_dependency.artifact.clone());
            let mut next_ctx = ctx.clone();
            next_ctx.dependency = relocated_dependency;
            process_dependency(state, next_ctx, next_relocations, same_ga);
            return;
        }

        let repositories = range
            .repository_per_version
            .get(version)
            .cloned()
            .map(|repo| vec![repo])
            .unwrap_or_else(|| ctx.repositories.clone());

        let interned_dependency = state.pool.intern_dependency(candidate_dependency.clone());
        let mut node = NodeData::with_dependency(interned_dependency, version.clone());
        node.version_constraint = range.constraint.clone();
        node.repositories = repositories.clone();
        node.request_context = state.request_context.clone();
        node.aliases = descriptor.aliases.clone();
        node.relocations = relocations.clone();
        node.managed = outcome.managed;
        node.premanaged_data = outcome.premanaged_data.clone();

        let node_id = place_node(state, &ctx, i, node);

        let traverse = descriptor_capable && traverser_allows;
        if traverse && !descriptor.dependencies.is_empty() {
            expand_children(state, &ctx, node_id, &candidate_artifact, &repositories, &descriptor, &managed_dependency);
        }
    }
}

fn place_node(state: &mut CollectState<'_>, ctx: &ProcessingContext, candidate_index: usize, node: NodeData) -> NodeId {
    if candidate_index == 0 {
        if let Some(target) = ctx.target {
            *state.graph.node_mut(target) = node;
            return target;
        }
    }
    let id = state.graph.push(node);
    state.graph.add_child(*ctx.parents.last().expect("parent path is never empty"), id);
    id
}

#[allow(clippy::too_many_arguments)]
fn place_stub(
    state: &mut CollectState<'_>,
    ctx: &ProcessingContext,
    candidate_index: usize,
    dependency: &Dependency,
    managed: &resolvent_model::ManagedFields,
    premanaged_data: &std::collections::BTreeMap<String, String>,
    relocations: &[Artifact],
) {
    let interned_dependency = state.pool.intern_dependency(dependency.clone());
    let mut node = NodeData::with_dependency(interned_dependency, dependency.artifact.version.clone());
    node.request_context = state.request_context.clone();
    node.relocations = relocations.to_vec();
    node.managed = *managed;
    node.premanaged_data = premanaged_data.clone();
    place_node(state, ctx, candidate_index, node);
}

#[allow(clippy::too_many_arguments)]
fn place_cycle_terminus(
    state: &mut CollectState<'_>,
    ctx: &ProcessingContext,
    candidate_index: usize,
    dependency: &Dependency,
    range: &crate::collaborators::VersionRangeResult,
    managed: &resolvent_model::ManagedFields,
    premanaged_data: &std::collections::BTreeMap<String, String>,
    relocations: &[Artifact],
    ancestor: NodeId,
) {
    let interned_dependency = state.pool.intern_dependency(dependency.clone());
    let mut node = NodeData::with_dependency(interned_dependency, dependency.artifact.version.clone());
    node.version_constraint = range.constraint.clone();
    node.request_context = state.request_context.clone();
    node.relocations = relocations.to_vec();
    node.managed = *managed;
    node.premanaged_data = premanaged_data.clone();
    node.children = state.graph.node(ancestor).children.clone();
    place_node(state, ctx, candidate_index, node);
}


#[allow(clippy::too_many_arguments)]
fn expand_children(
    state: &mut CollectState<'_>,
    ctx: &ProcessingContext,
    node_id: NodeId,
    candidate_artifact: &Artifact,
    repositories: &[RemoteRepository],
    descriptor: &ArtifactDescriptorResult,
    managed_dependency: &Dependency,
) {
    let path = parent_path(&state.graph, &ctx.parents);
    let decision = state.skipper.decide_and_record(candidate_artifact, &path, ctx.depth);
    for identity in state.skipper.drain_invalidations() {
        tracing::debug!("force resolution displaced a cached winner for {identity}; invalidating its child cache");
        state.pool.invalidate_children_for(&identity);
    }
    if decision != SkipDecision::Proceed {
        tracing::debug!("skipping children of {candidate_artifact} at depth {}: {decision:?}", ctx.depth);
        return;
    }

    let child_policies = ctx.policies.derive_child(managed_dependency, ctx.depth);
    let child_repositories = if state.session.ignore_descriptor_repositories {
        repositories.to_vec()
    } else {
        state
            .collaborators
            .repository_manager
            .aggregate(repositories, &descriptor.repositories, false)
    };
    let child_managed = merge_request_wins(&ctx.managed_dependencies, &descriptor.managed_dependencies);

    let mut parents = ctx.parents.clone();
    parents.push(node_id);

    let key = ChildrenKey::build(
        candidate_artifact,
        &child_repositories,
        child_policies.selector.as_ref(),
        child_policies.manager.as_ref(),
        child_policies.traverser.as_ref(),
        child_policies.filter.as_ref(),
    );

    if let Some(key) = &key {
        if let Some(cached) = state.pool.get_children(key) {
            let cached = cached.clone();
            for child_id in cached {
                state.graph.add_child(node_id, child_id);
            }
            return;
        }
    }

    let included: Vec<Dependency> = descriptor
        .dependencies
        .iter()
        .filter(|dep| child_policies.selector.include(dep))
        .cloned()
        .collect();

    let mut shell_ids = Vec::with_capacity(included.len());
    for dependency in &included {
        let interned_dependency = state.pool.intern_dependency(dependency.clone());
        let shell_id = state.graph.push(NodeData::with_dependency(interned_dependency, String::new()));
        state.graph.add_child(node_id, shell_id);
        shell_ids.push(shell_id);
        state.queue.push_back(ProcessingContext {
            policies: child_policies.clone(),
            repositories: child_repositories.clone(),
            managed_dependencies: child_managed.clone(),
            parents: parents.clone(),
            dependency: dependency.clone(),
            depth: ctx.depth + 1,
            target: Some(shell_id),
        });
    }

    if let Some(key) = key {
        if state.skipper.is_current_winner(candidate_artifact, ctx.depth) {
            state.pool.put_children(key, shell_ids);
        }
    }
}
