//! # Statesync Engine
//!
//! The synchronization engine: given a request to populate one or more
//! named properties of a state, it resolves the owning synchronizer for
//! each, populates that synchronizer's required properties first,
//! coalesces concurrent requests per property, merges fetched values into
//! the store, and aggregates partial failures across fan-out requests.
//!
//! ## Key Properties
//!
//! - **Coalescing**: at most one in-flight fetch per property; every
//!   concurrent caller awaits the same outcome.
//! - **Forced refresh**: `clear_store` supersedes a pending fetch without
//!   aborting it; last confirmed write wins.
//! - **Dependency ordering**: a synchronizer's required properties settle
//!   before its read runs; proxies re-sync them, others reuse present
//!   values.
//! - **Error aggregation**: fan-out attempts every property and reports
//!   all failures together; successes stay applied.
//! - **Clean bookkeeping**: the pending entry is removed on every settle
//!   path, so a failed fetch never blocks the next one.

pub mod error;
mod pending;
pub mod selector;
mod signals;

pub use error::{Result, SyncError};
pub use selector::StateSelector;
