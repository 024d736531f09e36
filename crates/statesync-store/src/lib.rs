//! # Statesync Store
//!
//! The reactive store boundary: the [`Store`] trait the engine writes
//! through, and a watch-channel-backed [`MemoryStore`] for tests and
//! embedders without their own store.
//!
//! The store is the single source of truth for state values. The engine
//! never caches: it snapshots before deciding whether a property needs a
//! fetch and re-reads after every confirmed dispatch.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{StateStream, StateUpdate, Store, StoreExt};
