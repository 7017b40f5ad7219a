//! # Aggregate state and actions.
//!
//! [`State`] maps slice names to their sub-state. It is immutable: every
//! update builds a new map and leaves the previous value untouched, so other
//! holders of an older `State` can keep reading it while the next transition runs.
//!
//! ## Example
//! ```rust
//! use modvisor::State;
//! use serde_json::json;
//!
//! let before = State::new().with("cart", json!([])).with("user", json!({"id": 7}));
//! let after = before.without(["cart"]);
//!
//! assert!(before.contains("cart"));
//! assert!(!after.contains("cart"));
//! assert_eq!(after.get("user"), Some(&json!({"id": 7})));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dispatched action: a `kind` tag plus an optional payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action type tag, e.g. `"cart/add"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Action {
    /// Creates an action without payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Returns the action with `payload` attached.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// True if the action has the given kind.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

/// Immutable aggregate state keyed by slice name.
///
/// Cloning is cheap (one `Arc` increment).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    slices: Arc<BTreeMap<String, Value>>,
}

impl State {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(slices: BTreeMap<String, Value>) -> Self {
        Self {
            slices: Arc::new(slices),
        }
    }

    /// Returns the sub-state of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slices.get(name)
    }

    /// True if `name` has a sub-state.
    pub fn contains(&self, name: &str) -> bool {
        self.slices.contains_key(name)
    }

    /// Slice names in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// True if the state holds no slices.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Returns a new state with `name` set to `value`.
    pub fn with(&self, name: impl Into<String>, value: Value) -> Self {
        let mut next = (*self.slices).clone();
        next.insert(name.into(), value);
        Self::from_map(next)
    }

    /// Returns a new state holding every slice except `names`.
    ///
    /// Names that are not present are ignored; the original state is never modified.
    pub fn without<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let drop: Vec<S> = names.into_iter().collect();
        let next = self
            .slices
            .iter()
            .filter(|(k, _)| !drop.iter().any(|d| d.as_ref() == k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self::from_map(next)
    }

    /// True if both values share the same underlying map.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.slices, &b.slices)
    }

    /// Converts the state into a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.slices
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for State {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
