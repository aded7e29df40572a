//! One concrete, synchronous implementation of `resolvent-collector`'s
//! collaborator traits, targeting the Maven POM/`maven-metadata.xml` format:
//! descriptor reading, version-range resolution, and repository-list
//! aggregation, plus the parsing and URL-layout helpers those
//! implementations are built from.
//!
//! Fetching the XML this module parses — over HTTP, from a local cache, or
//! anywhere else — is the embedder's job; this crate only ever sees XML
//! strings already in memory, per the collection engine's non-goals around
//! transport and local storage.

pub mod collaborators;
pub mod metadata;
pub mod pom;
pub mod repository;
pub mod version;
