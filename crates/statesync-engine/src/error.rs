//! Error types for the synchronization engine.

use thiserror::Error;

use statesync_core::CoreError;
use statesync_store::StoreError;

/// Errors that can occur during engine operations.
///
/// Cloneable so one outcome can be fanned out to every coalesced waiter;
/// nested failures are carried as messages, not sources.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// No synchronizer resolves for the requested property.
    #[error("no synchronizer defined for property \"{0}\"")]
    SynchronizerNotDefined(String),

    /// A non-proxy synchronizer lists its own property as required.
    #[error("synchronizer for \"{0}\" requires a reference to itself")]
    SelfDependency(String),

    /// `export` was invoked on a synchronizer without a write operation.
    #[error("synchronizer for \"{0}\" does not define a write operation")]
    WriteNotSupported(String),

    /// One or more properties failed during a fan-out operation. Carries
    /// every underlying failure; successful siblings stay applied.
    #[error("error syncing properties: {}", join_errors(.0))]
    Aggregate(Vec<SyncError>),

    /// A synchronizer's read failed.
    #[error("synchronizer read failed for \"{property}\": {message}")]
    Read { property: String, message: String },

    /// A synchronizer's write failed.
    #[error("synchronizer write failed for \"{property}\": {message}")]
    Write { property: String, message: String },

    /// The store rejected a dispatch or failed to confirm it.
    #[error("store error: {0}")]
    Store(String),

    /// The spawned fetch died without settling (task dropped or panicked).
    #[error("fetch for \"{0}\" was dropped before settling")]
    TaskDropped(String),

    /// A descriptor was used before being registered (facade level).
    #[error("state \"{0}\" is not registered")]
    StateNotRegistered(String),

    /// A state path was registered twice (facade level).
    #[error("state \"{0}\" is already registered")]
    StateAlreadyRegistered(String),

    /// The owning sync store was dropped while a composite capability
    /// still referenced it.
    #[error("sync store was released")]
    StoreReleased,
}

impl From<CoreError> for SyncError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotDefined(property) => Self::SynchronizerNotDefined(property),
            CoreError::UnknownReference(reference) => Self::SynchronizerNotDefined(reference),
            CoreError::InvalidDescriptor(message) => Self::Store(message),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}

fn join_errors(errors: &[SyncError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, SyncError>;
