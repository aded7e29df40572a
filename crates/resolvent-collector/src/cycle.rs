//! Cycle detection: a candidate dependency whose versionless identity
//! already appears among its own ancestors is a cycle, not a legitimate
//! re-expansion.

use resolvent_model::{Artifact, NodeId};

use crate::graph::DependencyGraph;

/// One recorded cycle, capped and reported on the result.
#[derive(Debug, Clone)]
pub struct CycleRecord {
    pub path: Vec<String>,
    pub target: String,
}

/// Scans `parents` (root-first) for the shallowest ancestor sharing
/// `candidate`'s versionless identity. Ancestors with no dependency (the
/// synthetic rootless root) never match, so a cycle back to a bare root
/// artifact falls through as an ordinary re-expansion.
pub fn detect_cycle(graph: &DependencyGraph, parents: &[NodeId], candidate: &Artifact) -> Option<usize> {
    let target = candidate.versionless();
    parents.iter().position(|&id| {
        graph
            .node(id)
            .dependency
            .as_ref()
            .map(|d| d.artifact.versionless())
            .as_ref()
            == Some(&target)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvent_model::{Dependency, NodeData};
    use std::sync::Arc;

    #[test]
    fn detects_ancestor_with_matching_identity() {
        let mut graph = DependencyGraph::new();
        let root = graph.push(NodeData::root(None, String::new()));
        let a = graph.push(NodeData {
            dependency: Some(Arc::new(Dependency::new(Artifact::new("g", "a", "1.0"), "compile"))),
            ..NodeData::root(None, "1.0".to_string())
        });
        let parents = vec![root, a];
        let candidate = Artifact::new("g", "a", "2.0");
        assert_eq!(detect_cycle(&graph, &parents, &candidate), Some(1));
    }

    #[test]
    fn no_match_when_identity_is_unseen() {
        let mut graph = DependencyGraph::new();
        let root = graph.push(NodeData::root(None, String::new()));
        let parents = vec![root];
        let candidate = Artifact::new("g", "a", "2.0");
        assert_eq!(detect_cycle(&graph, &parents, &candidate), None);
    }

    #[test]
    fn synthetic_root_never_matches() {
        let mut graph = DependencyGraph::new();
        let root = graph.push(NodeData::root(None, String::new()));
        let parents = vec![root];
        // A bare root has no dependency, so even a candidate sharing no
        // real identity can never "match" the synthetic root.
        let candidate = Artifact::new("g", "a", "1.0");
        assert_eq!(detect_cycle(&graph, &parents, &candidate), None);
    }
}
