//! Unified error type for the collection engine.

use miette::Diagnostic;
use thiserror::Error;

use crate::result::CollectResult;

/// Errors raised by `collect` and its collaborators.
#[derive(Debug, Error, Diagnostic)]
pub enum CollectError {
    /// A version-range resolution collaborator call failed.
    #[error("failed to resolve version range for {coordinate}: {message}")]
    VersionRangeResolution { coordinate: String, message: String },

    /// A descriptor-read collaborator call failed.
    #[error("failed to read descriptor for {coordinate}: {message}")]
    DescriptorRead { coordinate: String, message: String },

    /// The graph-transformation hook raised an error.
    #[error("graph transformation failed: {message}")]
    Transformation { message: String },

    /// Raised after a successful (possibly partial) collection that
    /// recorded one or more exceptions.
    #[error("dependency collection failed at {first_error_path}: {} exception(s) recorded", partial.exceptions.len())]
    #[diagnostic(help("inspect `partial.exceptions` for the full list"))]
    Collection {
        partial: Box<CollectResult>,
        first_error_path: String,
    },
}
