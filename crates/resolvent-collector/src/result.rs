//! `collect`'s request and result types.

use resolvent_model::{Dependency, NodeId, RemoteRepository};

use crate::cycle::CycleRecord;
use crate::graph::DependencyGraph;

/// One request to `collect`: either a root dependency (its
/// own version is resolved and its descriptor read before collection
/// starts) or a bare root artifact (collection starts from a synthetic
/// root with no descriptor of its own).
#[derive(Debug, Clone, Default)]
pub struct CollectRequest {
    pub root_dependency: Option<Dependency>,
    pub root_artifact: Option<resolvent_model::Artifact>,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
    pub repositories: Vec<RemoteRepository>,
    pub request_context: String,
}

/// One recorded failure: the kind of collaborator call that
/// failed, a human-readable message, and the `" -> "`-joined artifact
/// trail from the root to the coordinate that triggered it.
#[derive(Debug, Clone)]
pub struct RecordedException {
    pub message: String,
    pub error_path: String,
}

/// The output of `collect`: the root node (possibly synthetic), every
/// exception and cycle recorded along the way (bounded by the session's
/// error budgets), and an echo of the request.
#[derive(Debug)]
pub struct CollectResult {
    pub graph: DependencyGraph,
    pub root: NodeId,
    pub exceptions: Vec<RecordedException>,
    pub cycles: Vec<CycleRecord>,
    pub request: CollectRequest,
}

impl CollectResult {
    /// The first recorded exception's error path, used as
    /// `CollectError::Collection`'s `first_error_path`.
    pub fn first_error_path(&self) -> Option<&str> {
        self.exceptions.first().map(|e| e.error_path.as_str())
    }
}
