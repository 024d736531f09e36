//! Proptest strategies for property-based tests.

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde_json::Value;

use statesync_core::StateValue;

/// A lowercase identifier usable as a property or state name.
pub fn property_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// A scalar JSON value, including null (an "absent" property).
pub fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

/// A state object with up to `max_properties` scalar properties.
pub fn state_value(max_properties: usize) -> impl Strategy<Value = StateValue> {
    btree_map(property_name(), leaf_value(), 0..=max_properties)
        .prop_map(|entries| entries.into_iter().collect())
}

/// A chain of unique state names, root first, for building nested
/// descriptor trees.
pub fn descriptor_chain(max_depth: usize) -> impl Strategy<Value = Vec<String>> {
    vec(property_name(), 1..=max_depth).prop_map(|mut names| {
        names.sort();
        names.dedup();
        names
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use statesync_core::{StateDescriptor, SynchronizerRegistry};

    proptest! {
        #[test]
        fn test_descriptor_path_orders_root_to_leaf(names in descriptor_chain(5)) {
            let mut descriptor = StateDescriptor::root(
                names[0].clone(),
                StateValue::new(),
                SynchronizerRegistry::empty(),
            );
            let mut keep_alive = vec![descriptor.clone()];
            for name in &names[1..] {
                descriptor = StateDescriptor::child(
                    &descriptor,
                    name.clone(),
                    StateValue::new(),
                    SynchronizerRegistry::empty(),
                );
                keep_alive.push(descriptor.clone());
            }

            prop_assert_eq!(descriptor.path().to_string(), names.join("."));

            let mut chain: Vec<String> = descriptor
                .ancestors()
                .iter()
                .map(|d| d.name().to_string())
                .collect();
            chain.push(descriptor.name().to_string());
            prop_assert_eq!(chain, names);
        }

        #[test]
        fn test_merge_keeps_untouched_properties(
            base in state_value(6),
            patch in state_value(6),
        ) {
            let mut merged = base.clone();
            for (name, value) in patch.clone() {
                merged.insert(name, value);
            }

            // Patched values win; everything else retains its prior value.
            for (name, value) in &patch {
                prop_assert_eq!(merged.get(name), Some(value));
            }
            for (name, value) in &base {
                if !patch.contains_key(name) {
                    prop_assert_eq!(merged.get(name), Some(value));
                }
            }
        }
    }
}
