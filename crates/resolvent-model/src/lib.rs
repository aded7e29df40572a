//! Data model shared by the dependency collection engine and its
//! collaborators: artifact coordinates, dependencies, the resolved node
//! arena, and repository values.
//!
//! This crate is intentionally free of parsing, I/O, and algorithm code.

pub mod artifact;
pub mod dependency;
pub mod node;
pub mod repository;
pub mod session;

pub use artifact::{Artifact, VersionlessKey};
pub use dependency::{Dependency, Exclusion};
pub use node::{ManagedFields, NodeData, NodeId};
pub use repository::RemoteRepository;
pub use session::CollectSession;
