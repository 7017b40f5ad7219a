//! # Slice reducer abstraction and function-backed implementation.
//!
//! A [`Reducer`] computes the next sub-state of one slice from its previous
//! sub-state (`None` before the slice has data) and an [`Action`]. The common
//! handle type is [`ReducerRef`], an `Arc<dyn Reducer>`; two registrations
//! are "the same reducer" when their `Arc`s point to the same allocation.
//!
//! ## Example
//! ```rust
//! use modvisor::{Action, Reducer, ReducerFn, ReducerRef};
//! use serde_json::{json, Value};
//!
//! let counter: ReducerRef = ReducerFn::arc(|state, action| {
//!     let n = state.and_then(Value::as_i64).unwrap_or(0);
//!     if action.is("inc") { json!(n + 1) } else { json!(n) }
//! });
//!
//! assert_eq!(counter.reduce(None, &Action::new("inc")), json!(1));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::state::Action;

/// # Pure state-transition function for one slice.
pub trait Reducer: Send + Sync + 'static {
    /// Returns the next sub-state. Must not panic on unknown actions; return the
    /// previous state (or the initial one when `state` is `None`) instead.
    fn reduce(&self, state: Option<&Value>, action: &Action) -> Value;
}

/// Shared handle to a reducer.
pub type ReducerRef = Arc<dyn Reducer>;

/// Named reducers, ordered by slice name.
pub type ReducerMap = BTreeMap<String, ReducerRef>;

/// Function-backed reducer.
pub struct ReducerFn<F> {
    f: F,
}

impl<F> ReducerFn<F>
where
    F: Fn(Option<&Value>, &Action) -> Value + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> Reducer for ReducerFn<F>
where
    F: Fn(Option<&Value>, &Action) -> Value + Send + Sync + 'static,
{
    fn reduce(&self, state: Option<&Value>, action: &Action) -> Value {
        (self.f)(state, action)
    }
}

impl<F> fmt::Debug for ReducerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerFn").finish_non_exhaustive()
    }
}
