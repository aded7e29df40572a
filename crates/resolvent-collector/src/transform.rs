//! The graph-transformation hook: an optional post-pass the session may
//! supply, run once over the assembled graph after the main collection
//! loop drains. Typical use: pick winners among conflicting versions,
//! compute effective scope, prune.

use std::collections::{HashMap, VecDeque};

use resolvent_model::{NodeId, VersionlessKey};

use crate::graph::DependencyGraph;

/// A string-keyed property bag threaded through a transformer invocation.
#[derive(Debug, Clone, Default)]
pub struct TransformContext {
    pub properties: HashMap<String, String>,
}

/// A post-processor over the assembled graph. Exceptions are surfaced as a
/// plain `Result`; the collector records them on the result and retains
/// the pre-transform graph either way.
pub trait DependencyGraphTransformer {
    fn transform(&self, graph: &mut DependencyGraph, root: NodeId, context: &mut TransformContext) -> Result<(), String>;
}

/// Maven's classic "nearest wins, then first declared" conflict
/// resolution, expressed as a post-pass: a breadth-first walk over the
/// assembled graph records, per versionless identity, the first node id
/// encountered (which by construction of the collector's queue ordering —
/// depth-N before depth-(N+1), siblings in request order — is the
/// nearest/first-declared winner), then prunes every other occurrence's
/// children to empty so callers can still see what was *requested* without
/// re-walking a subtree the collector already decided is not authoritative.
#[derive(Debug, Default)]
pub struct ConflictResolvingTransformer;

impl DependencyGraphTransformer for ConflictResolvingTransformer {
    fn transform(&self, graph: &mut DependencyGraph, root: NodeId, _context: &mut TransformContext) -> Result<(), String> {
        let mut winners: HashMap<VersionlessKey, NodeId> = HashMap::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let mut visited = vec![false; graph.len()];
        queue.push_back(root);
        visited[root.0] = true;

        let mut order = Vec::new();
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &child in graph.node(id).children.clone().iter() {
                if !visited[child.0] {
                    visited[child.0] = true;
                    queue.push_back(child);
                }
            }
        }

        for &id in &order {
            let Some(dep) = graph.node(id).dependency.as_ref() else {
                continue;
            };
            winners.entry(dep.artifact.versionless()).or_insert(id);
        }

        for &id in &order {
            let Some(dep) = graph.node(id).dependency.as_ref() else {
                continue;
            };
            let key = dep.artifact.versionless();
            if winners.get(&key) != Some(&id) {
                graph.node_mut(id).children.clear();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvent_model::{Artifact, Dependency, NodeData};
    use std::sync::Arc;

    fn leaf(group: &str, artifact: &str, version: &str) -> NodeData {
        NodeData {
            dependency: Some(Arc::new(Dependency::new(Artifact::new(group, artifact, version), "compile"))),
            ..NodeData::root(None, version.to_string())
        }
    }

    #[test]
    fn prunes_non_winning_occurrences_children() {
        let mut graph = DependencyGraph::new();
        let root = graph.push(NodeData::root(None, String::new()));
        let a = graph.push(leaf("g", "a", "1.0"));
        let c_near = graph.push(leaf("g", "c", "1.0"));
        let c_far = graph.push(leaf("g", "c", "2.0"));
        let grandchild = graph.push(leaf("g", "d", "1.0"));

        graph.add_child(root, a);
        graph.add_child(root, c_near);
        graph.add_child(a, c_far);
        graph.add_child(c_far, grandchild);

        let mut ctx = TransformContext::default();
        ConflictResolvingTransformer.transform(&mut graph, root, &mut ctx).unwrap();

        assert!(graph.node(c_near).children.is_empty());
        assert!(graph.node(c_far).children.is_empty());
    }

    #[test]
    fn winner_keeps_its_own_children() {
        let mut graph = DependencyGraph::new();
        let root = graph.push(NodeData::root(None, String::new()));
        let winner = graph.push(leaf("g", "a", "1.0"));
        let child = graph.push(leaf("g", "b", "1.0"));
        graph.add_child(root, winner);
        graph.add_child(winner, child);

        let mut ctx = TransformContext::default();
        ConflictResolvingTransformer.transform(&mut graph, root, &mut ctx).unwrap();

        assert_eq!(graph.node(winner).children, vec![child]);
    }
}
