//! Test fixtures and scripted synchronizers.
//!
//! Common setup code for engine and integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Semaphore};

use statesync::{StateSelector, StaticResolver, SyncStore};
use statesync_core::{
    ReadContext, StateDescriptor, StateValue, Synchronizer, SynchronizerError, SynchronizerRef,
    WriteContext,
};
use statesync_engine::Result;
use statesync_store::MemoryStore;

/// A test fixture with a memory store, a static resolver, and a sync
/// store wired together.
pub struct TestFixture {
    pub sync_store: SyncStore,
    pub resolver: Arc<StaticResolver>,
}

impl TestFixture {
    pub fn new() -> Self {
        let resolver = Arc::new(StaticResolver::new());
        let sync_store = SyncStore::new(Arc::new(MemoryStore::new()), resolver.clone());
        Self {
            sync_store,
            resolver,
        }
    }

    /// Register a synchronizer instance under a reference.
    pub fn register_synchronizer(
        &self,
        reference: impl Into<SynchronizerRef>,
        synchronizer: Arc<dyn Synchronizer>,
    ) {
        self.resolver.insert(reference, synchronizer);
    }

    /// Register a state descriptor with the sync store.
    pub async fn register_state(&self, descriptor: Arc<StateDescriptor>) -> Result<StateValue> {
        self.sync_store.register(descriptor).await
    }

    /// The cached selector for a registered descriptor.
    pub fn selector(&self, descriptor: &Arc<StateDescriptor>) -> Result<StateSelector> {
        self.sync_store.state(descriptor)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves to a fixed value. Counts reads and records the dependency
/// state and context of the last read.
pub struct FixedSynchronizer {
    value: Value,
    required: Vec<String>,
    proxy: bool,
    reads: AtomicUsize,
    last_known: Mutex<Option<StateValue>>,
    last_ctx: Mutex<Option<ReadContext>>,
}

impl FixedSynchronizer {
    pub fn new(value: Value) -> Arc<Self> {
        Self::build(value, &[], false)
    }

    pub fn with_required(value: Value, required: &[&str]) -> Arc<Self> {
        Self::build(value, required, false)
    }

    pub fn proxy(value: Value, required: &[&str]) -> Arc<Self> {
        Self::build(value, required, true)
    }

    fn build(value: Value, required: &[&str], proxy: bool) -> Arc<Self> {
        Arc::new(Self {
            value,
            required: required.iter().map(|s| s.to_string()).collect(),
            proxy,
            reads: AtomicUsize::new(0),
            last_known: Mutex::new(None),
            last_ctx: Mutex::new(None),
        })
    }

    /// How many times `read` has run.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// The dependency state the last read received.
    pub fn last_known(&self) -> Option<StateValue> {
        self.last_known.lock().unwrap().clone()
    }

    /// The context the last read received.
    pub fn last_ctx(&self) -> Option<ReadContext> {
        self.last_ctx.lock().unwrap().clone()
    }
}

#[async_trait]
impl Synchronizer for FixedSynchronizer {
    fn required_properties(&self) -> &[String] {
        &self.required
    }

    fn is_proxy(&self) -> bool {
        self.proxy
    }

    async fn read(
        &self,
        known: StateValue,
        ctx: ReadContext,
    ) -> std::result::Result<Value, SynchronizerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        *self.last_known.lock().unwrap() = Some(known);
        *self.last_ctx.lock().unwrap() = Some(ctx);
        Ok(self.value.clone())
    }
}

/// Always fails with a fixed message.
pub struct FailingSynchronizer {
    message: String,
    reads: AtomicUsize,
}

impl FailingSynchronizer {
    pub fn new(message: &str) -> Arc<Self> {
        Arc::new(Self {
            message: message.to_string(),
            reads: AtomicUsize::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synchronizer for FailingSynchronizer {
    async fn read(
        &self,
        _known: StateValue,
        _ctx: ReadContext,
    ) -> std::result::Result<Value, SynchronizerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(SynchronizerError::failed(self.message.clone()))
    }
}

/// Blocks in `read` until a permit is released. Each read signals its
/// start on the channel and consumes one permit; tests use this to hold a
/// fetch in flight while asserting coalescing behavior.
pub struct GateSynchronizer {
    value: Value,
    gate: Arc<Semaphore>,
    started: mpsc::UnboundedSender<()>,
    reads: AtomicUsize,
}

impl GateSynchronizer {
    pub fn new(value: Value) -> (Arc<Self>, mpsc::UnboundedReceiver<()>, Arc<Semaphore>) {
        let (started, started_rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let sync = Arc::new(Self {
            value,
            gate: gate.clone(),
            started,
            reads: AtomicUsize::new(0),
        });
        (sync, started_rx, gate)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synchronizer for GateSynchronizer {
    async fn read(
        &self,
        _known: StateValue,
        _ctx: ReadContext,
    ) -> std::result::Result<Value, SynchronizerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let _ = self.started.send(());
        self.gate.acquire().await.unwrap().forget();
        Ok(self.value.clone())
    }
}

/// A write-capable synchronizer that records every exported value.
pub struct RecordingWriter {
    ack: Value,
    written: Mutex<Vec<Value>>,
}

impl RecordingWriter {
    pub fn new(ack: Value) -> Arc<Self> {
        Arc::new(Self {
            ack,
            written: Mutex::new(Vec::new()),
        })
    }

    pub fn written(&self) -> Vec<Value> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl Synchronizer for RecordingWriter {
    fn supports_write(&self) -> bool {
        true
    }

    async fn read(
        &self,
        _known: StateValue,
        _ctx: ReadContext,
    ) -> std::result::Result<Value, SynchronizerError> {
        Ok(Value::Null)
    }

    async fn write(
        &self,
        value: Value,
        _ctx: WriteContext,
    ) -> std::result::Result<Value, SynchronizerError> {
        self.written.lock().unwrap().push(value);
        Ok(self.ack.clone())
    }
}
