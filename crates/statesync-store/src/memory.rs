//! In-memory implementation of the Store trait.
//!
//! Primary store for tests and for embedders without a reactive store of
//! their own. State lives in one JSON tree behind an RwLock; every
//! confirmed update broadcasts the new root on a watch channel, which
//! gives `select` its latest-value-replay semantics.

use std::sync::RwLock;

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::watch;

use statesync_core::{StatePath, StateValue};

use crate::error::{Result, StoreError};
use crate::traits::{StateStream, StateUpdate, Store};

/// In-memory store. All data is lost on drop. Thread-safe via RwLock;
/// writes are serialized, so dispatch confirmations are totally ordered.
pub struct MemoryStore {
    root: RwLock<Value>,
    confirmed: watch::Sender<Value>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        let root = Value::Object(StateValue::new());
        let (confirmed, _) = watch::channel(root.clone());
        Self {
            root: RwLock::new(root),
            confirmed,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn snapshot(&self, path: &StatePath) -> Option<Value> {
        let root = self.root.read().unwrap();
        value_at(&root, path).cloned()
    }

    fn select(&self, path: &StatePath) -> StateStream {
        let rx = self.confirmed.subscribe();
        let path = path.clone();

        // Replay the latest confirmed value, then follow changes, skipping
        // roots that left this path's value untouched.
        stream::unfold((rx, path, false, None::<Option<Value>>), |state| async move {
            let (mut rx, path, mut started, mut last) = state;
            loop {
                if started && rx.changed().await.is_err() {
                    return None;
                }
                started = true;
                let current = value_at(&rx.borrow_and_update(), &path).cloned();
                if last.as_ref() == Some(&current) {
                    continue;
                }
                last = Some(current.clone());
                return Some((current, (rx, path, started, last)));
            }
        })
        .boxed()
    }

    async fn dispatch(&self, update: StateUpdate) -> Result<Value> {
        let path = update.path().clone();
        tracing::trace!(path = %path, "dispatching update");
        let new_root = {
            let mut root = self.root.write().unwrap();
            apply(&mut root, update)?;
            root.clone()
        };

        // Confirmation: broadcast the new root, then report the value now
        // standing at the updated path.
        self.confirmed.send_replace(new_root.clone());
        Ok(value_at(&new_root, &path)
            .cloned()
            .unwrap_or(Value::Object(StateValue::new())))
    }
}

/// Navigate to the value at `path`, if every segment exists.
fn value_at<'a>(root: &'a Value, path: &StatePath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Navigate to the object at `path`, creating missing or null segments as
/// empty objects along the way.
fn object_at_mut<'a>(
    root: &'a mut Value,
    path: &StatePath,
) -> Result<&'a mut StateValue> {
    let mut current = root;
    let mut walked = Vec::new();
    for segment in path.segments() {
        walked.push(segment.as_str());
        let map = current
            .as_object_mut()
            .ok_or_else(|| StoreError::NotAnObject(walked[..walked.len() - 1].join(".")))?;
        let entry = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(StateValue::new()));
        if entry.is_null() {
            *entry = Value::Object(StateValue::new());
        }
        current = entry;
    }
    current
        .as_object_mut()
        .ok_or_else(|| StoreError::NotAnObject(walked.join(".")))
}

fn apply(root: &mut Value, update: StateUpdate) -> Result<()> {
    match update {
        StateUpdate::SetProperty {
            path,
            property,
            value,
        } => {
            let state = object_at_mut(root, &path)?;
            state.insert(property, value);
        }
        StateUpdate::MergeState { path, value } => {
            let state = object_at_mut(root, &path)?;
            for (property, v) in value {
                state.insert(property, v);
            }
        }
    }
    Ok(())
}
