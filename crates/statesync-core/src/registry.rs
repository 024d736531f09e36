//! Synchronizer registry: which capability owns which property.

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::types::SynchronizerRef;

/// Maps a state's property names to synchronizer references.
///
/// Two variants:
/// - **PerProperty**: each property has its own synchronizer.
/// - **WholeState**: one synchronizer handles every property of the state.
///
/// A registry is immutable after construction. It holds references rather
/// than live instances; a [`SynchronizerResolver`](crate::SynchronizerResolver)
/// turns them into instances at sync time.
#[derive(Debug, Clone)]
pub enum SynchronizerRegistry {
    /// Property name -> synchronizer reference.
    PerProperty(HashMap<String, SynchronizerRef>),
    /// A single synchronizer that owns the entire state.
    WholeState(SynchronizerRef),
}

impl SynchronizerRegistry {
    /// Build a per-property registry from (name, reference) pairs.
    pub fn per_property<N, I>(entries: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, SynchronizerRef)>,
    {
        Self::PerProperty(
            entries
                .into_iter()
                .map(|(name, reference)| (name.into(), reference))
                .collect(),
        )
    }

    /// Build a whole-state registry around one collection synchronizer.
    pub fn whole_state(reference: SynchronizerRef) -> Self {
        Self::WholeState(reference)
    }

    /// An empty per-property registry (a state with no synchronized
    /// properties, e.g. a pure container for child states).
    pub fn empty() -> Self {
        Self::PerProperty(HashMap::new())
    }

    /// Resolve the synchronizer reference for a property.
    ///
    /// A whole-state registry resolves every property to its single
    /// synchronizer; a per-property registry fails with
    /// [`CoreError::NotDefined`] for unmapped names.
    pub fn resolve(&self, property: &str) -> Result<&SynchronizerRef> {
        match self {
            Self::PerProperty(entries) => entries
                .get(property)
                .ok_or_else(|| CoreError::NotDefined(property.to_string())),
            Self::WholeState(reference) => Ok(reference),
        }
    }

    /// The individually enumerable property names.
    ///
    /// Empty for a whole-state registry: no property is enumerable on its
    /// own, the synchronizer owns everything.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::PerProperty(entries) => entries.keys().map(String::as_str).collect(),
            Self::WholeState(_) => Vec::new(),
        }
    }

    pub fn is_whole_state(&self) -> bool {
        matches!(self, Self::WholeState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_property_resolves_mapped_names() {
        let registry = SynchronizerRegistry::per_property([
            ("age", SynchronizerRef::new("age-sync")),
            ("city", SynchronizerRef::new("city-sync")),
        ]);

        assert_eq!(registry.resolve("age").unwrap().as_str(), "age-sync");
        assert_eq!(registry.resolve("city").unwrap().as_str(), "city-sync");
    }

    #[test]
    fn test_per_property_fails_for_unmapped_name() {
        let registry =
            SynchronizerRegistry::per_property([("age", SynchronizerRef::new("age-sync"))]);

        match registry.resolve("missing") {
            Err(CoreError::NotDefined(name)) => assert_eq!(name, "missing"),
            other => panic!("expected NotDefined, got {other:?}"),
        }
    }

    #[test]
    fn test_whole_state_resolves_everything() {
        let registry = SynchronizerRegistry::whole_state(SynchronizerRef::new("all"));

        assert_eq!(registry.resolve("anything").unwrap().as_str(), "all");
        assert_eq!(registry.resolve("else").unwrap().as_str(), "all");
    }

    #[test]
    fn test_whole_state_has_no_enumerable_keys() {
        let registry = SynchronizerRegistry::whole_state(SynchronizerRef::new("all"));
        assert!(registry.keys().is_empty());
        assert!(registry.is_whole_state());
    }

    #[test]
    fn test_per_property_keys() {
        let registry = SynchronizerRegistry::per_property([
            ("age", SynchronizerRef::new("a")),
            ("zip", SynchronizerRef::new("z")),
        ]);

        let mut keys = registry.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec!["age", "zip"]);
    }
}
