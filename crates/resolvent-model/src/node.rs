//! The resolved dependency graph's node type.
//!
//! A resolved dependency node is represented as arena data (`NodeData`)
//! addressed by `NodeId`, rather than an owned tree of pointers, so that
//! cycles can be represented as shared subtrees instead of true reference
//! cycles.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::artifact::Artifact;
use crate::dependency::Dependency;
use crate::repository::RemoteRepository;

/// Index of a node within a [`crate::node::NodeData`] arena. Stable for the
/// lifetime of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Bitmask of which `Dependency` fields dependency management rewrote for a
/// node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagedFields(u8);

impl ManagedFields {
    pub const VERSION: Self = Self(1 << 0);
    pub const SCOPE: Self = Self(1 << 1);
    pub const OPTIONAL: Self = Self(1 << 2);
    pub const PROPERTIES: Self = Self(1 << 3);
    pub const EXCLUSIONS: Self = Self(1 << 4);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ManagedFields {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A node in the resolved dependency graph.
///
/// `dependency` is `None` only for a synthetic root constructed from a bare
/// root artifact.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub dependency: Option<Arc<Dependency>>,
    pub children: Vec<NodeId>,
    pub version: String,
    pub version_constraint: String,
    pub repositories: Vec<RemoteRepository>,
    pub request_context: String,
    pub aliases: Vec<Artifact>,
    pub relocations: Vec<Artifact>,
    pub managed: ManagedFields,
    /// Pre-managed snapshot, stamped here only when the session runs in
    /// verbose dependency-management mode.
    pub premanaged_data: BTreeMap<String, String>,
}

impl NodeData {
    /// Construct a node from an owned `Dependency`, wrapping it for storage.
    ///
    /// Used for the synthetic root (`None`) and by call sites that have not
    /// gone through the data pool's interning. Production node construction
    /// during collection should prefer [`NodeData::with_dependency`] so that
    /// equal dependencies share one allocation.
    pub fn root(dependency: Option<Dependency>, version: String) -> Self {
        Self {
            dependency: dependency.map(Arc::new),
            children: Vec::new(),
            version,
            version_constraint: String::new(),
            repositories: Vec::new(),
            request_context: String::new(),
            aliases: Vec::new(),
            relocations: Vec::new(),
            managed: ManagedFields::empty(),
            premanaged_data: BTreeMap::new(),
        }
    }

    /// Construct a node from an already-interned `Arc<Dependency>`.
    pub fn with_dependency(dependency: Arc<Dependency>, version: String) -> Self {
        Self {
            dependency: Some(dependency),
            children: Vec::new(),
            version,
            version_constraint: String::new(),
            repositories: Vec::new(),
            request_context: String::new(),
            aliases: Vec::new(),
            relocations: Vec::new(),
            managed: ManagedFields::empty(),
            premanaged_data: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_fields_bitmask() {
        let mut m = ManagedFields::empty();
        assert!(m.is_empty());
        m.insert(ManagedFields::VERSION);
        m.insert(ManagedFields::SCOPE);
        assert!(m.contains(ManagedFields::VERSION));
        assert!(m.contains(ManagedFields::SCOPE));
        assert!(!m.contains(ManagedFields::OPTIONAL));
    }
}
