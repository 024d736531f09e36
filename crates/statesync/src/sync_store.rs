//! The composition root: descriptor registration and selector lookup.
//!
//! A `SyncStore` owns the descriptor-to-registry table and hands out one
//! [`StateSelector`] per state path. Caching selectors per path is what
//! makes the pending-request map truly per-state: every caller that syncs
//! a property of a given state coalesces against the same bookkeeping, no
//! matter how they reached the selector.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;

use statesync_core::{StateDescriptor, StateValue, SynchronizerResolver};
use statesync_engine::{Result, StateSelector, SyncError};
use statesync_store::{StateUpdate, Store, StoreExt};

/// The statesync composition root. Cheaply cloneable; all clones share the
/// descriptor table and selector cache.
#[derive(Clone)]
pub struct SyncStore {
    inner: Arc<SyncStoreInner>,
}

struct SyncStoreInner {
    store: Arc<dyn Store>,
    resolver: Arc<dyn SynchronizerResolver>,
    descriptors: Mutex<HashMap<String, Arc<StateDescriptor>>>,
    selectors: Mutex<HashMap<String, StateSelector>>,
}

impl SyncStore {
    pub fn new(store: Arc<dyn Store>, resolver: Arc<dyn SynchronizerResolver>) -> Self {
        Self {
            inner: Arc::new(SyncStoreInner {
                store,
                resolver,
                descriptors: Mutex::new(HashMap::new()),
                selectors: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register a state descriptor and seed its defaults.
    ///
    /// Defaults are dispatched only for properties the store does not
    /// already hold, so re-opening an application over a persistent store
    /// never clobbers synced values. Registering the same path twice is an
    /// error.
    ///
    /// Returns the state's confirmed value after seeding.
    pub async fn register(&self, descriptor: Arc<StateDescriptor>) -> Result<StateValue> {
        let key = descriptor.path().to_string();
        {
            let mut descriptors = self.inner.descriptors.lock().unwrap();
            if descriptors.contains_key(&key) {
                return Err(SyncError::StateAlreadyRegistered(key));
            }
            descriptors.insert(key.clone(), descriptor.clone());
        }
        tracing::debug!(state = %key, "registered state");

        let current = self.inner.store.state_object(descriptor.path());
        let missing: StateValue = descriptor
            .defaults()
            .iter()
            .filter(|(name, _)| !current.contains_key(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        // Dispatched even when empty: this materializes the state object
        // at its path so child registrations and selects see it.
        let confirmed = self
            .inner
            .store
            .dispatch(StateUpdate::merge(descriptor.path().clone(), missing))
            .await?;
        Ok(match confirmed {
            Value::Object(map) => map,
            _ => StateValue::new(),
        })
    }

    /// The selector for a registered descriptor's state.
    ///
    /// Created on first use and cached per path, so exactly one
    /// pending-request map exists per state.
    pub fn state(&self, descriptor: &Arc<StateDescriptor>) -> Result<StateSelector> {
        let key = descriptor.path().to_string();
        if !self.inner.descriptors.lock().unwrap().contains_key(&key) {
            return Err(SyncError::StateNotRegistered(key));
        }

        let mut selectors = self.inner.selectors.lock().unwrap();
        Ok(selectors
            .entry(key)
            .or_insert_with(|| {
                StateSelector::new(
                    self.inner.store.clone(),
                    self.inner.resolver.clone(),
                    descriptor.clone(),
                )
            })
            .clone())
    }

    /// A weak handle for capabilities that must not keep the store alive
    /// (composite synchronizers held by the resolver).
    pub fn handle(&self) -> SyncStoreHandle {
        SyncStoreHandle(Arc::downgrade(&self.inner))
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }
}

/// Weak reference to a [`SyncStore`]; upgrade at use time.
#[derive(Clone)]
pub struct SyncStoreHandle(Weak<SyncStoreInner>);

impl SyncStoreHandle {
    pub fn upgrade(&self) -> Option<SyncStore> {
        self.0.upgrade().map(|inner| SyncStore { inner })
    }
}
