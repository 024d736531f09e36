//! Composite synchronizer for nested states.
//!
//! A property whose value is itself a synchronized state gets one of
//! these: its `read` syncs every property of the nested state's own
//! registry and returns the merged object. A synchronizer one level up can
//! then declare the nested property as required and mark itself a proxy to
//! force a full nested refresh instead of a presence check, which is how
//! dependency chains cross state boundaries.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use statesync_core::{
    ReadContext, StateDescriptor, StateValue, SyncOptions, Synchronizer, SynchronizerError,
};
use statesync_engine::SyncError;

use crate::sync_store::SyncStoreHandle;

/// Synchronizes a nested state by syncing every property in that state's
/// registry and merging the results over its current snapshot.
pub struct StateSynchronizer {
    handle: SyncStoreHandle,
    child: Arc<StateDescriptor>,
}

impl StateSynchronizer {
    pub fn new(handle: SyncStoreHandle, child: Arc<StateDescriptor>) -> Self {
        Self { handle, child }
    }
}

#[async_trait]
impl Synchronizer for StateSynchronizer {
    async fn read(
        &self,
        _known: StateValue,
        _ctx: ReadContext,
    ) -> std::result::Result<Value, SynchronizerError> {
        let sync_store = self
            .handle
            .upgrade()
            .ok_or_else(|| SynchronizerError::failed(SyncError::StoreReleased.to_string()))?;
        let selector = sync_store
            .state(&self.child)
            .map_err(|error| SynchronizerError::failed(error.to_string()))?;

        // The child selector is cached per path, so these syncs coalesce
        // with any direct callers of the nested state.
        let keys: Vec<String> = selector
            .registry()
            .keys()
            .into_iter()
            .map(str::to_string)
            .collect();

        let results = join_all(keys.into_iter().map(|key| {
            let selector = selector.clone();
            async move {
                let value = selector.sync_property(&key, SyncOptions::default()).await?;
                Ok::<(String, Value), SyncError>((key, value))
            }
        }))
        .await;

        let mut errors = Vec::new();
        let mut synced = Vec::new();
        for result in results {
            match result {
                Ok(entry) => synced.push(entry),
                Err(error) => errors.push(error),
            }
        }
        if !errors.is_empty() {
            return Err(SynchronizerError::failed(
                SyncError::Aggregate(errors).to_string(),
            ));
        }

        // Merge over the nested state's snapshot: synced values win,
        // untouched properties keep their prior value.
        let mut merged = selector.state();
        for (key, value) in synced {
            merged.insert(key, value);
        }
        Ok(Value::Object(merged))
    }
}
