//! The synchronizer capability trait and its call-context types.
//!
//! A synchronizer produces (`read`) or persists (`write`) the value of one
//! property, given the values of the properties it depends on. The engine
//! resolves dependencies, coalesces requests, and writes results into the
//! store; synchronizers only talk to their data source.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::error::Result;
use crate::types::{StateValue, SynchronizerRef};

/// Per-call options accepted by the engine's `require`/`sync`/`export`
/// operations.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Force a refetch: clear the stored value first and bypass coalescing
    /// against any pending non-forced request.
    pub clear_store: bool,
    /// Opaque request parameters forwarded to the synchronizer.
    pub params: Option<Value>,
}

impl SyncOptions {
    /// Options requesting a forced refresh.
    pub fn clear_store() -> Self {
        Self {
            clear_store: true,
            params: None,
        }
    }

    /// Options carrying request parameters.
    pub fn with_params(params: Value) -> Self {
        Self {
            clear_store: false,
            params: Some(params),
        }
    }
}

/// Call context handed to [`Synchronizer::read`].
#[derive(Debug, Clone)]
pub struct ReadContext {
    /// The property being fetched.
    pub property: String,
    /// Whether this fetch was a forced refresh.
    pub clear_store: bool,
    /// Request parameters from the caller, if any.
    pub params: Option<Value>,
}

impl ReadContext {
    pub fn new(property: impl Into<String>, options: &SyncOptions) -> Self {
        Self {
            property: property.into(),
            clear_store: options.clear_store,
            params: options.params.clone(),
        }
    }
}

/// Call context handed to [`Synchronizer::write`].
#[derive(Debug, Clone)]
pub struct WriteContext {
    /// The property being persisted.
    pub property: String,
    /// Request parameters from the caller, if any.
    pub params: Option<Value>,
}

impl WriteContext {
    pub fn new(property: impl Into<String>, options: &SyncOptions) -> Self {
        Self {
            property: property.into(),
            params: options.params.clone(),
        }
    }
}

/// Failure raised by a synchronizer's `read` or `write`.
///
/// Carries a message rather than a source so outcomes stay cloneable and
/// can be fanned out to every coalesced waiter.
#[derive(Debug, Clone, Error)]
pub enum SynchronizerError {
    /// The underlying fetch or persist failed.
    #[error("{0}")]
    Failed(String),

    /// The synchronizer defines no write operation.
    #[error("write not supported")]
    WriteNotSupported,
}

impl SynchronizerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// The capability contract: fetch or persist one property of a state.
///
/// # Contract
///
/// - `required_properties` lists the properties the engine must populate
///   before `read` runs. A non-proxy synchronizer must never list its own
///   property; the engine rejects that with a self-dependency error.
/// - A *proxy* synchronizer aggregates others: the engine actively
///   re-syncs its required properties instead of reusing stored values.
/// - `read` receives the state after dependency resolution; it returns the
///   new value for `ctx.property` (or, for a whole-state synchronizer, the
///   value of whichever property the context names).
#[async_trait]
pub trait Synchronizer: Send + Sync {
    /// Properties that must be populated before this synchronizer runs.
    fn required_properties(&self) -> &[String] {
        &[]
    }

    /// Whether required properties are force-refreshed rather than merely
    /// ensured present.
    fn is_proxy(&self) -> bool {
        false
    }

    /// Whether [`write`](Self::write) is implemented. `export` fails fast
    /// when this is false, without invoking anything.
    fn supports_write(&self) -> bool {
        false
    }

    /// Fetch the property's value.
    async fn read(
        &self,
        known: StateValue,
        ctx: ReadContext,
    ) -> std::result::Result<Value, SynchronizerError>;

    /// Persist the property's current value.
    async fn write(
        &self,
        _value: Value,
        _ctx: WriteContext,
    ) -> std::result::Result<Value, SynchronizerError> {
        Err(SynchronizerError::WriteNotSupported)
    }
}

/// Late-binding of registry references to live synchronizer instances.
///
/// This is the dependency-injection boundary: registries stay immutable
/// tables of references, and the resolver (the embedder's container, or
/// the provided `StaticResolver`) supplies instances at sync time.
pub trait SynchronizerResolver: Send + Sync {
    fn resolve(&self, reference: &SynchronizerRef) -> Result<Arc<dyn Synchronizer>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Minimal;

    #[async_trait]
    impl Synchronizer for Minimal {
        async fn read(
            &self,
            _known: StateValue,
            _ctx: ReadContext,
        ) -> std::result::Result<Value, SynchronizerError> {
            Ok(json!("value"))
        }
    }

    #[tokio::test]
    async fn test_defaults() {
        let sync = Minimal;
        assert!(sync.required_properties().is_empty());
        assert!(!sync.is_proxy());
        assert!(!sync.supports_write());

        let ctx = WriteContext::new("p", &SyncOptions::default());
        let result = sync.write(json!(1), ctx).await;
        assert!(matches!(result, Err(SynchronizerError::WriteNotSupported)));
    }

    #[test]
    fn test_read_context_carries_options() {
        let options = SyncOptions {
            clear_store: true,
            params: Some(json!({"page": 2})),
        };
        let ctx = ReadContext::new("city", &options);
        assert_eq!(ctx.property, "city");
        assert!(ctx.clear_store);
        assert_eq!(ctx.params, Some(json!({"page": 2})));
    }
}
