//! Error types for the core contracts.

use thiserror::Error;

/// Errors raised while resolving registries, references, or descriptors.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// No synchronizer is mapped for the requested property.
    #[error("no synchronizer defined for property \"{0}\"")]
    NotDefined(String),

    /// A registry reference that the resolver does not know.
    #[error("no synchronizer registered for reference \"{0}\"")]
    UnknownReference(String),

    /// A malformed descriptor (e.g. an empty path segment).
    #[error("invalid state descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
