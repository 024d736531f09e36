//! # Statesync
//!
//! On-demand state synchronization: populate named properties of
//! application state from external sources, without duplicate concurrent
//! fetches, with inter-property dependencies resolved first.
//!
//! ## Overview
//!
//! - **Synchronizers**: units of work that fetch (`read`) or persist
//!   (`write`) one property, declaring the properties they depend on.
//! - **Registries**: map each property of a state to its synchronizer, or
//!   designate one collection synchronizer for the whole state.
//! - **Selectors**: per-state engines that coalesce concurrent requests,
//!   resolve dependency chains, and aggregate fan-out failures.
//! - **Nested states**: composite synchronizers make dependency chains
//!   cross state boundaries.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use statesync::{
//!     StateDescriptor, StateValue, StaticResolver, SyncOptions, SyncStore, SynchronizerRef,
//!     SynchronizerRegistry,
//! };
//! use statesync::store::MemoryStore;
//!
//! async fn example() {
//!     let resolver = Arc::new(StaticResolver::new());
//!     // resolver.insert("zip-sync", ...); resolver.insert("city-sync", ...);
//!
//!     let registry = SynchronizerRegistry::per_property([
//!         ("zip", SynchronizerRef::new("zip-sync")),
//!         ("city", SynchronizerRef::new("city-sync")),
//!     ]);
//!     let session = StateDescriptor::root("session", StateValue::new(), registry);
//!
//!     let sync_store = SyncStore::new(Arc::new(MemoryStore::new()), resolver);
//!     sync_store.register(session.clone()).await.unwrap();
//!
//!     let selector = sync_store.state(&session).unwrap();
//!     // Syncing "city" fetches "zip" first, then "city".
//!     let state = selector.sync("city", SyncOptions::default()).await.unwrap();
//!     println!("city = {:?}", state.get("city"));
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `statesync::core` - Contracts (descriptors, registries, synchronizers)
//! - `statesync::store` - The store boundary and `MemoryStore`
//! - `statesync::engine` - The `StateSelector` engine

pub mod resolver;
pub mod state_synchronizer;
pub mod sync_store;

// Re-export component crates
pub use statesync_core as core;
pub use statesync_engine as engine;
pub use statesync_store as store;

// Re-export main types for convenience
pub use resolver::StaticResolver;
pub use state_synchronizer::StateSynchronizer;
pub use sync_store::{SyncStore, SyncStoreHandle};

// Re-export commonly used component types
pub use statesync_core::{
    ReadContext, StateDescriptor, StatePath, StateValue, SyncOptions, Synchronizer,
    SynchronizerError, SynchronizerRef, SynchronizerRegistry, SynchronizerResolver, WriteContext,
};
pub use statesync_engine::{Result, StateSelector, SyncError};
pub use statesync_store::{MemoryStore, StateUpdate, Store};
