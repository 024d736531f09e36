//! Error types for the store boundary.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A path segment exists but is not an object, so it cannot hold
    /// properties or child states.
    #[error("state at \"{0}\" is not an object")]
    NotAnObject(String),

    /// The store has shut down and no longer confirms dispatches.
    #[error("store is closed")]
    Closed,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
