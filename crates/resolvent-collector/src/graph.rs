//! The resolved dependency graph's storage: an arena of [`NodeData`]
//! addressed by [`NodeId`], rather than an owned tree of pointers. A cycle
//! terminus node shares its ancestor's `children` vector by value (a
//! cloned `Vec<NodeId>`), which can never form a true reference cycle that
//! would defeat a simple reachability walk.

use resolvent_model::{NodeData, NodeId};

/// Owns every node created during one `collect` call. The root's `NodeId`
/// is handed back to the caller as part of `CollectResult`; the pool's
/// lifetime otherwise matches the arena's.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<NodeData>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new node and return its stable id.
    pub fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        id
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `child` to `parent`'s children list. Children are always
    /// appended in request order and the list is append-only during
    /// collection.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Depth-first walk of reachable node ids starting at `root`, each id
    /// visited once even if several parents reference it (e.g. after a
    /// pool-spliced child subtree).
    pub fn reachable_from(&self, root: NodeId) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if seen[id.0] {
                continue;
            }
            seen[id.0] = true;
            order.push(id);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvent_model::{Artifact, Dependency};
    use std::sync::Arc;

    fn leaf(group: &str, artifact: &str, version: &str) -> NodeData {
        NodeData {
            dependency: Some(Arc::new(Dependency::new(Artifact::new(group, artifact, version), "compile"))),
            ..NodeData::root(None, version.to_string())
        }
    }

    #[test]
    fn push_assigns_increasing_ids() {
        let mut graph = DependencyGraph::new();
        let a = graph.push(leaf("g", "a", "1.0"));
        let b = graph.push(leaf("g", "b", "1.0"));
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn add_child_appends_in_order() {
        let mut graph = DependencyGraph::new();
        let root = graph.push(NodeData::root(None, String::new()));
        let a = graph.push(leaf("g", "a", "1.0"));
        let b = graph.push(leaf("g", "b", "1.0"));
        graph.add_child(root, a);
        graph.add_child(root, b);
        assert_eq!(graph.node(root).children, vec![a, b]);
    }

    #[test]
    fn reachable_visits_shared_child_once() {
        let mut graph = DependencyGraph::new();
        let root = graph.push(NodeData::root(None, String::new()));
        let a = graph.push(leaf("g", "a", "1.0"));
        let shared = graph.push(leaf("g", "shared", "1.0"));
        graph.add_child(root, a);
        graph.add_child(root, shared);
        graph.add_child(a, shared);

        let order = graph.reachable_from(root);
        assert_eq!(order.iter().filter(|&&id| id == shared).count(), 1);
        assert_eq!(order.len(), 3);
    }
}
