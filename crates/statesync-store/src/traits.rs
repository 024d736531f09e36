//! Store trait: the abstract interface to the reactive state store.
//!
//! This trait keeps the engine store-agnostic. Implementations include the
//! in-memory store (primary for tests) and whatever reactive store an
//! embedding application already runs, adapted behind this interface.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use statesync_core::{StatePath, StateValue};

use crate::error::Result;

/// A live stream of state values for one path.
///
/// Replays the latest confirmed value on subscription, then yields each
/// subsequent confirmed value. `None` means the path holds no value.
pub type StateStream = BoxStream<'static, Option<Value>>;

/// An update dispatched into the store.
#[derive(Debug, Clone)]
pub enum StateUpdate {
    /// Set one property of the state at `path`. Missing intermediate
    /// states are created as empty objects.
    SetProperty {
        path: StatePath,
        property: String,
        value: Value,
    },
    /// Merge an object over the state at `path`; merged values win,
    /// untouched properties keep their prior value.
    MergeState { path: StatePath, value: StateValue },
}

impl StateUpdate {
    pub fn set(path: StatePath, property: impl Into<String>, value: Value) -> Self {
        Self::SetProperty {
            path,
            property: property.into(),
            value,
        }
    }

    pub fn merge(path: StatePath, value: StateValue) -> Self {
        Self::MergeState { path, value }
    }

    /// The path the update applies to.
    pub fn path(&self) -> &StatePath {
        match self {
            Self::SetProperty { path, .. } => path,
            Self::MergeState { path, .. } => path,
        }
    }
}

/// The Store trait: the engine's only view of application state.
///
/// # Contract
///
/// - `snapshot` returns the latest *confirmed* value; readers never see a
///   half-applied update.
/// - `dispatch` resolves only after the update is confirmed, returning the
///   new value at the update's path.
/// - `select` replays the latest value, then follows confirmations.
#[async_trait]
pub trait Store: Send + Sync {
    /// Synchronously read the current value at `path`.
    fn snapshot(&self, path: &StatePath) -> Option<Value>;

    /// Subscribe to the value at `path`.
    fn select(&self, path: &StatePath) -> StateStream;

    /// Apply an update and wait for confirmation.
    ///
    /// Returns the confirmed value at the update's path.
    async fn dispatch(&self, update: StateUpdate) -> Result<Value>;
}

/// Extension helpers over any store.
pub trait StoreExt: Store {
    /// Snapshot the state at `path` as an object, treating an absent or
    /// non-object value as empty.
    fn state_object(&self, path: &StatePath) -> StateValue {
        match self.snapshot(path) {
            Some(Value::Object(map)) => map,
            _ => StateValue::new(),
        }
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
