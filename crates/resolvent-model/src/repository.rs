//! The `RemoteRepository` value type the collector attaches to resolved
//! nodes.
//!
//! Aggregation (merging two repository lists by id, applying mirror/policy
//! rewriting) is an external collaborator's job — this type only carries
//! the fields the collector itself reads or copies.

/// A remote repository as seen by the collector: just enough identity and
/// policy to be copied onto a resolved node and compared by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
    pub release_enabled: bool,
    pub snapshot_enabled: bool,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            release_enabled: true,
            snapshot_enabled: false,
        }
    }
}

impl std::fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}
