//! # Statesync Core
//!
//! Pure contracts for the statesync engine: state descriptors, synchronizer
//! registries, and the capability traits.
//!
//! This crate contains no I/O and no runtime. It defines the vocabulary the
//! engine and the store share.
//!
//! ## Key Types
//!
//! - [`StateValue`] - The JSON-shaped value of one state
//! - [`StatePath`] - Ordered segments naming a state in the store tree
//! - [`StateDescriptor`] - Immutable identity + registry record for a state
//! - [`SynchronizerRegistry`] - Maps property names to synchronizer references
//! - [`Synchronizer`] - The capability that fetches or persists one property
//! - [`SynchronizerResolver`] - Late-binds references to live instances

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod synchronizer;
pub mod types;

pub use descriptor::StateDescriptor;
pub use error::{CoreError, Result};
pub use registry::SynchronizerRegistry;
pub use synchronizer::{
    ReadContext, SyncOptions, Synchronizer, SynchronizerError, SynchronizerResolver, WriteContext,
};
pub use types::{is_present, StatePath, StateValue, SynchronizerRef};
