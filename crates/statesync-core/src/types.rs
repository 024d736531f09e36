//! Value and identifier types shared across the workspace.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value of one state: a JSON object keyed by property name.
///
/// The store holds these; the engine reads and patches them but never
/// caches them.
pub type StateValue = serde_json::Map<String, Value>;

/// Whether a property value counts as present.
///
/// A missing key and an explicit `null` are both absent; `require` treats
/// them identically.
pub fn is_present(value: Option<&Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}

/// Ordered path segments naming one state in the store tree, root first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatePath(Vec<String>);

impl StatePath {
    /// Build a path from segments, root first.
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// A single-segment path for a root state.
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Extend this path with a child segment.
    pub fn join(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The leaf segment (the state's own name).
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Opaque reference to a synchronizer, resolved to a live instance by a
/// [`SynchronizerResolver`](crate::SynchronizerResolver).
///
/// Registries hold these instead of instances so they stay immutable and
/// free of fetch state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SynchronizerRef(String);

impl SynchronizerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SynchronizerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SynchronizerRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_display_and_join() {
        let path = StatePath::root("session").join("settings");
        assert_eq!(path.to_string(), "session.settings");
        assert_eq!(path.segments(), &["session".to_string(), "settings".to_string()]);
        assert_eq!(path.leaf(), Some("settings"));
    }

    #[test]
    fn test_presence() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&Value::Null)));
        assert!(is_present(Some(&json!(""))));
        assert!(is_present(Some(&json!(false))));
        assert!(is_present(Some(&json!({"a": 1}))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_join_appends_one_segment(
                segments in prop::collection::vec("[a-z]{1,8}", 1..5),
                leaf in "[a-z]{1,8}",
            ) {
                let base = StatePath::new(segments.clone());
                let joined = base.join(leaf.clone());

                prop_assert_eq!(joined.segments().len(), segments.len() + 1);
                prop_assert_eq!(joined.leaf(), Some(leaf.as_str()));
                prop_assert_eq!(&joined.segments()[..segments.len()], &segments[..]);
            }
        }
    }
}
