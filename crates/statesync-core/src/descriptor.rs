//! State descriptors: immutable identity records for synchronized states.

use std::sync::{Arc, Weak};

use crate::registry::SynchronizerRegistry;
use crate::types::{StatePath, StateValue};

/// Identifies one state: its path segment, default value, registry, and
/// (for nested states) a weak back-reference to its parent.
///
/// Descriptors are created once at state-definition time and shared as
/// `Arc<StateDescriptor>`. The full store path is computed at construction
/// from the parent chain, so path resolution never walks the tree at
/// runtime.
#[derive(Debug)]
pub struct StateDescriptor {
    name: String,
    defaults: StateValue,
    registry: SynchronizerRegistry,
    parent: Option<Weak<StateDescriptor>>,
    path: StatePath,
}

impl StateDescriptor {
    /// Create a root state descriptor.
    pub fn root(
        name: impl Into<String>,
        defaults: StateValue,
        registry: SynchronizerRegistry,
    ) -> Arc<Self> {
        let name = name.into();
        let path = StatePath::root(name.clone());
        Arc::new(Self {
            name,
            defaults,
            registry,
            parent: None,
            path,
        })
    }

    /// Create a child state descriptor under `parent`.
    ///
    /// The child holds only a weak back-reference; ownership flows parent
    /// to child, never back, so ancestor chains are finite by construction.
    pub fn child(
        parent: &Arc<StateDescriptor>,
        name: impl Into<String>,
        defaults: StateValue,
        registry: SynchronizerRegistry,
    ) -> Arc<Self> {
        let name = name.into();
        let path = parent.path.join(name.clone());
        Arc::new(Self {
            name,
            defaults,
            registry,
            parent: Some(Arc::downgrade(parent)),
            path,
        })
    }

    /// The state's own path segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default value dispatched into the store at registration.
    pub fn defaults(&self) -> &StateValue {
        &self.defaults
    }

    pub fn registry(&self) -> &SynchronizerRegistry {
        &self.registry
    }

    /// The parent descriptor, if it is still alive.
    pub fn parent(&self) -> Option<Arc<StateDescriptor>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// The full store path, root segment first.
    pub fn path(&self) -> &StatePath {
        &self.path
    }

    /// Ancestor descriptors ordered root first, excluding `self`.
    ///
    /// Ancestors must still be alive (held by the registration table);
    /// dropped ancestors are simply absent from the result.
    pub fn ancestors(&self) -> Vec<Arc<StateDescriptor>> {
        let mut chain = Vec::new();
        let mut current = self.parent();
        while let Some(ancestor) = current {
            current = ancestor.parent();
            chain.push(ancestor);
        }
        chain.reverse();
        chain
    }
}
