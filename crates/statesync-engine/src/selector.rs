//! The synchronization engine for one state instance.
//!
//! A [`StateSelector`] owns the pending-request map for its state path and
//! exposes the require/sync/export operations. It resolves which
//! synchronizer owns each property, populates that synchronizer's required
//! properties first, coalesces concurrent requests per property, writes
//! results into the store, and aggregates partial failures across fan-out
//! requests.

use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use serde_json::Value;
use tokio::sync::oneshot;

use statesync_core::{
    is_present, ReadContext, StateDescriptor, StatePath, StateValue, SyncOptions, Synchronizer,
    SynchronizerRegistry, SynchronizerResolver, WriteContext,
};
use statesync_store::{StateUpdate, Store, StoreExt};

use crate::error::{Result, SyncError};
use crate::pending::{Claimed, PendingRequests, SharedRequest};
use crate::signals;

/// The synchronization engine for one state path.
///
/// Cheaply cloneable; all clones share the same pending-request map, so
/// concurrent requests for the same property coalesce onto one fetch no
/// matter which clone issued them. The store remains the single source of
/// truth: the selector re-reads it rather than caching values.
#[derive(Clone)]
pub struct StateSelector {
    inner: Arc<SelectorInner>,
}

impl std::fmt::Debug for StateSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSelector")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

struct SelectorInner {
    descriptor: Arc<StateDescriptor>,
    path: StatePath,
    store: Arc<dyn Store>,
    resolver: Arc<dyn SynchronizerResolver>,
    pending: PendingRequests,
}

impl StateSelector {
    /// Create a selector for the descriptor's state path.
    ///
    /// Embedders should create at most one selector per path (the facade's
    /// `SyncStore` caches them); multiple selectors for one path would each
    /// own their own pending map and defeat coalescing between them.
    pub fn new(
        store: Arc<dyn Store>,
        resolver: Arc<dyn SynchronizerResolver>,
        descriptor: Arc<StateDescriptor>,
    ) -> Self {
        let path = descriptor.path().clone();
        Self {
            inner: Arc::new(SelectorInner {
                descriptor,
                path,
                store,
                resolver,
                pending: PendingRequests::new(),
            }),
        }
    }

    pub fn descriptor(&self) -> &Arc<StateDescriptor> {
        &self.inner.descriptor
    }

    pub fn registry(&self) -> &SynchronizerRegistry {
        self.inner.descriptor.registry()
    }

    pub fn path(&self) -> &StatePath {
        &self.inner.path
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads (no fetch)
    // ─────────────────────────────────────────────────────────────────────

    /// Snapshot of the full state; empty if the store holds nothing here.
    pub fn state(&self) -> StateValue {
        self.inner.current_state()
    }

    /// The current value of one property; `None` when the key is missing.
    /// No fetch is triggered.
    pub fn property(&self, name: &str) -> Option<Value> {
        self.inner.current_state().get(name).cloned()
    }

    /// Live stream of the full state, replaying the latest value.
    pub fn state_stream(&self) -> BoxStream<'static, StateValue> {
        self.inner
            .store
            .select(&self.inner.path)
            .map(|value| match value {
                Some(Value::Object(map)) => map,
                _ => StateValue::new(),
            })
            .boxed()
    }

    /// Live stream of one property's value.
    pub fn property_stream(&self, name: &str) -> BoxStream<'static, Option<Value>> {
        let name = name.to_string();
        self.state_stream()
            .map(move |state| state.get(&name).cloned())
            .boxed()
    }

    /// Live stream of one property, filtered to present values.
    pub fn defined_property(&self, name: &str) -> BoxStream<'static, Value> {
        self.property_stream(name)
            .filter_map(|value| async move { value.filter(|v| !v.is_null()) })
            .boxed()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Synchronization
    // ─────────────────────────────────────────────────────────────────────

    /// Ensure the property is present: resolve immediately with the
    /// current state when it already holds a value, otherwise fetch it via
    /// [`sync`](Self::sync).
    pub async fn require(&self, name: &str, options: SyncOptions) -> Result<StateValue> {
        self.inner
            .clone()
            .require_one(name.to_string(), options)
            .await
    }

    /// Ensure every named property is present, fanning out concurrently.
    ///
    /// Failures are collected, not short-circuited: every property is
    /// attempted, successes stay applied, and the aggregate error carries
    /// one entry per failed property.
    pub async fn require_all(&self, names: &[&str], options: SyncOptions) -> Result<StateValue> {
        self.inner
            .clone()
            .require_many(to_owned(names), options)
            .await
    }

    /// [`require`](Self::require), projected to the property's value.
    pub async fn require_property(&self, name: &str, options: SyncOptions) -> Result<Value> {
        let state = self.require(name, options).await?;
        Ok(state.get(name).cloned().unwrap_or(Value::Null))
    }

    /// Unconditionally (re)populate the property via its synchronizer,
    /// subject to request coalescing.
    pub async fn sync(&self, name: &str, options: SyncOptions) -> Result<StateValue> {
        self.inner.clone().sync_one(name.to_string(), options).await
    }

    /// Sync every named property concurrently; same fan-out/fan-in
    /// semantics as [`require_all`](Self::require_all).
    pub async fn sync_all(&self, names: &[&str], options: SyncOptions) -> Result<StateValue> {
        self.inner
            .clone()
            .sync_many(to_owned(names), options)
            .await
    }

    /// [`sync`](Self::sync), projected to the property's value.
    pub async fn sync_property(&self, name: &str, options: SyncOptions) -> Result<Value> {
        let state = self.sync(name, options).await?;
        Ok(state.get(name).cloned().unwrap_or(Value::Null))
    }

    /// Hand the property's current value to its synchronizer's write
    /// operation. Fails with [`SyncError::WriteNotSupported`] before
    /// invoking anything when the synchronizer defines no write.
    pub async fn export(&self, name: &str, options: SyncOptions) -> Result<Value> {
        self.inner.export_one(name.to_string(), options).await
    }

    /// Export every named property concurrently; failures aggregate like
    /// [`sync_all`](Self::sync_all). An empty list yields no results.
    pub async fn export_all(&self, names: &[&str], options: SyncOptions) -> Result<Vec<Value>> {
        self.inner.export_many(to_owned(names), options).await
    }

    /// Write one property's value through the store's update channel and
    /// resolve with the state once the store confirms it.
    pub async fn dispatch(&self, name: &str, value: Value) -> Result<StateValue> {
        self.inner.dispatch_property(name, value).await?;
        Ok(self.inner.current_state())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Syncing signals
    // ─────────────────────────────────────────────────────────────────────

    /// Level-triggered signal: `true` while a fetch for the property is in
    /// flight. Replays the current level, then reports transitions only.
    pub fn is_syncing_property(&self, name: &str) -> BoxStream<'static, bool> {
        let name = name.to_string();
        signals::bool_signal(self.inner.pending.subscribe(), move |pending| {
            pending.contains(&name)
        })
    }

    /// Fires with the property name whenever its fetch starts.
    pub fn on_property_syncing(&self, name: &str) -> BoxStream<'static, String> {
        let name_out = name.to_string();
        self.is_syncing_property(name)
            .filter_map(move |syncing| {
                let name = name_out.clone();
                async move { syncing.then_some(name) }
            })
            .boxed()
    }

    /// Fires with the property name whenever it is not (or no longer)
    /// being fetched.
    pub fn on_property_synced(&self, name: &str) -> BoxStream<'static, String> {
        let name_out = name.to_string();
        self.is_syncing_property(name)
            .filter_map(move |syncing| {
                let name = name_out.clone();
                async move { (!syncing).then_some(name) }
            })
            .boxed()
    }

    /// Fires once all named properties are simultaneously in flight.
    pub fn on_every_property_syncing(&self, names: &[&str]) -> BoxStream<'static, Vec<String>> {
        self.every_signal(names, true)
    }

    /// Fires once no named property has a fetch in flight.
    pub fn on_every_property_synced(&self, names: &[&str]) -> BoxStream<'static, Vec<String>> {
        self.every_signal(names, false)
    }

    /// Fires with the names currently in flight, on every change; the
    /// first emission is the first property to start syncing.
    pub fn on_some_property_syncing(&self, names: &[&str]) -> BoxStream<'static, Vec<String>> {
        signals::subset_signal(
            self.inner.pending.subscribe(),
            to_owned(names),
            |pending, name| pending.contains(name),
        )
    }

    /// Fires with the names currently not in flight, on every change.
    pub fn on_some_property_synced(&self, names: &[&str]) -> BoxStream<'static, Vec<String>> {
        signals::subset_signal(
            self.inner.pending.subscribe(),
            to_owned(names),
            |pending, name| !pending.contains(name),
        )
    }

    fn every_signal(&self, names: &[&str], syncing: bool) -> BoxStream<'static, Vec<String>> {
        let names = to_owned(names);
        let names_out = names.clone();
        signals::bool_signal(self.inner.pending.subscribe(), move |pending| {
            names.iter().all(|name| pending.contains(name) == syncing)
        })
        .filter_map(move |level| {
            let names = names_out.clone();
            async move { level.then_some(names) }
        })
        .boxed()
    }
}

impl SelectorInner {
    fn current_state(&self) -> StateValue {
        self.store.state_object(&self.path)
    }

    fn resolve_synchronizer(&self, property: &str) -> Result<Arc<dyn Synchronizer>> {
        let reference = self.descriptor.registry().resolve(property)?;
        Ok(self.resolver.resolve(reference)?)
    }

    async fn dispatch_property(&self, property: &str, value: Value) -> Result<Value> {
        let update = StateUpdate::set(self.path.clone(), property, value);
        Ok(self.store.dispatch(update).await?)
    }

    fn require_one(
        self: Arc<Self>,
        property: String,
        options: SyncOptions,
    ) -> BoxFuture<'static, Result<StateValue>> {
        async move {
            let state = self.current_state();
            if is_present(state.get(&property)) {
                return Ok(state);
            }
            self.sync_one(property, options).await
        }
        .boxed()
    }

    fn require_many(
        self: Arc<Self>,
        properties: Vec<String>,
        options: SyncOptions,
    ) -> BoxFuture<'static, Result<StateValue>> {
        async move {
            if properties.is_empty() {
                return Ok(self.current_state());
            }
            let results = join_all(
                properties
                    .iter()
                    .map(|p| self.clone().require_one(p.clone(), options.clone())),
            )
            .await;
            self.settle(results)
        }
        .boxed()
    }

    fn sync_many(
        self: Arc<Self>,
        properties: Vec<String>,
        options: SyncOptions,
    ) -> BoxFuture<'static, Result<StateValue>> {
        async move {
            if properties.is_empty() {
                return Ok(self.current_state());
            }
            let results = join_all(
                properties
                    .iter()
                    .map(|p| self.clone().sync_one(p.clone(), options.clone())),
            )
            .await;
            self.settle(results)
        }
        .boxed()
    }

    /// Fan-in: collect failures, and on success resolve with one fresh
    /// snapshot taken after every individual operation has completed.
    fn settle(&self, results: Vec<Result<StateValue>>) -> Result<StateValue> {
        let errors: Vec<SyncError> = results.into_iter().filter_map(|r| r.err()).collect();
        if errors.is_empty() {
            Ok(self.current_state())
        } else {
            Err(SyncError::Aggregate(errors))
        }
    }

    fn sync_one(
        self: Arc<Self>,
        property: String,
        options: SyncOptions,
    ) -> BoxFuture<'static, Result<StateValue>> {
        async move {
            let synchronizer = self.resolve_synchronizer(&property)?;

            if !synchronizer.is_proxy() {
                // Validate before touching the store; a self-dependent
                // synchronizer would otherwise recurse forever.
                if synchronizer
                    .required_properties()
                    .iter()
                    .any(|required| required == &property)
                {
                    return Err(SyncError::SelfDependency(property));
                }

                // Forced refresh: the clearing write is confirmed before
                // the pending map is consulted, so no reader can observe
                // the stale value after this call coalesces or fetches.
                if options.clear_store {
                    self.dispatch_property(&property, Value::Null).await?;
                }
            }

            let (tx, rx) = oneshot::channel::<Result<StateValue>>();
            let claimed = self.pending.claim(&property, options.clear_store, || {
                let name = property.clone();
                rx.map(move |settled| match settled {
                    Ok(outcome) => outcome,
                    Err(_) => Err(SyncError::TaskDropped(name)),
                })
                .boxed()
                .shared()
            });

            let (id, request) = match claimed {
                Claimed::Coalesced(request) => {
                    tracing::debug!(property = %property, "coalescing onto pending fetch");
                    return request.await;
                }
                Claimed::Started { id, request } => (id, request),
            };

            // The fetch runs as its own task so the pending entry is
            // cleared on every settle path even if all callers drop.
            let inner = Arc::clone(&self);
            let name = property.clone();
            tokio::spawn(async move {
                let outcome = inner
                    .clone()
                    .run_fetch(synchronizer, name.clone(), options)
                    .await;
                if let Err(error) = &outcome {
                    tracing::warn!(property = %name, %error, "sync failed");
                }
                inner.pending.complete(&name, id);
                let _ = tx.send(outcome);
            });

            request.await
        }
        .boxed()
    }

    /// One fetch: dependencies, read, dispatch, fresh snapshot.
    async fn run_fetch(
        self: Arc<Self>,
        synchronizer: Arc<dyn Synchronizer>,
        property: String,
        options: SyncOptions,
    ) -> Result<StateValue> {
        let required = synchronizer.required_properties().to_vec();

        // Dependencies settle (or fail as an aggregate) before the
        // property's own read runs. A proxy actively refreshes its
        // dependencies with the caller's options; anything else only
        // ensures presence, reusing stored values.
        let known = if synchronizer.is_proxy() {
            self.clone().sync_many(required, options.clone()).await?
        } else {
            self.clone()
                .require_many(required, SyncOptions::default())
                .await?
        };

        let ctx = ReadContext::new(property.clone(), &options);
        let value = synchronizer
            .read(known, ctx)
            .await
            .map_err(|error| SyncError::Read {
                property: property.clone(),
                message: error.to_string(),
            })?;

        self.dispatch_property(&property, value).await?;
        Ok(self.current_state())
    }

    async fn export_one(&self, property: String, options: SyncOptions) -> Result<Value> {
        let synchronizer = self.resolve_synchronizer(&property)?;
        if !synchronizer.supports_write() {
            return Err(SyncError::WriteNotSupported(property));
        }

        let value = self
            .current_state()
            .get(&property)
            .cloned()
            .unwrap_or(Value::Null);
        let ctx = WriteContext::new(property.clone(), &options);
        synchronizer
            .write(value, ctx)
            .await
            .map_err(|error| SyncError::Write {
                property,
                message: error.to_string(),
            })
    }

    async fn export_many(&self, properties: Vec<String>, options: SyncOptions) -> Result<Vec<Value>> {
        if properties.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(
            properties
                .iter()
                .map(|p| self.export_one(p.clone(), options.clone())),
        )
        .await;

        let mut values = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(value) => values.push(value),
                Err(error) => errors.push(error),
            }
        }
        if errors.is_empty() {
            Ok(values)
        } else {
            Err(SyncError::Aggregate(errors))
        }
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
