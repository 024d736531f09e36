//! A table-backed synchronizer resolver.
//!
//! Embedders with a dependency-injection container implement
//! [`SynchronizerResolver`] over it; everyone else registers instances
//! here. Insertion stays open after construction because composite
//! synchronizers need a [`SyncStore`](crate::SyncStore) handle, which only
//! exists once the resolver does.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use statesync_core::{CoreError, Synchronizer, SynchronizerRef, SynchronizerResolver};

/// Maps synchronizer references to registered instances.
#[derive(Default)]
pub struct StaticResolver {
    entries: RwLock<HashMap<String, Arc<dyn Synchronizer>>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance under a reference, replacing any previous one.
    pub fn insert(&self, reference: impl Into<SynchronizerRef>, synchronizer: Arc<dyn Synchronizer>) {
        let reference = reference.into();
        self.entries
            .write()
            .unwrap()
            .insert(reference.as_str().to_string(), synchronizer);
    }

    /// Builder-style registration for setup code.
    pub fn with(
        self,
        reference: impl Into<SynchronizerRef>,
        synchronizer: Arc<dyn Synchronizer>,
    ) -> Self {
        self.insert(reference, synchronizer);
        self
    }
}

impl SynchronizerResolver for StaticResolver {
    fn resolve(&self, reference: &SynchronizerRef) -> statesync_core::Result<Arc<dyn Synchronizer>> {
        self.entries
            .read()
            .unwrap()
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| CoreError::UnknownReference(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use statesync_core::{ReadContext, StateValue, SynchronizerError};

    struct Noop;

    #[async_trait]
    impl Synchronizer for Noop {
        async fn read(
            &self,
            _known: StateValue,
            _ctx: ReadContext,
        ) -> std::result::Result<Value, SynchronizerError> {
            Ok(json!(null))
        }
    }

    #[test]
    fn test_resolves_registered_instance() {
        let resolver = StaticResolver::new().with("noop", Arc::new(Noop));
        assert!(resolver.resolve(&SynchronizerRef::new("noop")).is_ok());
    }

    #[test]
    fn test_unknown_reference_fails() {
        let resolver = StaticResolver::new();
        match resolver.resolve(&SynchronizerRef::new("ghost")) {
            Err(CoreError::UnknownReference(reference)) => assert_eq!(reference, "ghost"),
            other => panic!(
                "expected UnknownReference, got {:?}",
                other.map(|_| "<synchronizer>")
            ),
        }
    }
}
