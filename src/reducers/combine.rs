//! # Combined reducer.
//!
//! [`CombinedReducer`] turns a [`ReducerMap`] snapshot into one transition
//! function over the aggregate [`State`]: every registered slice reducer gets
//! its own sub-state and the action, and the result holds exactly the
//! registered slices.
//!
//! ## Rules
//! - Unchanged input (every slice value equal, same key set) returns the **same**
//!   `State` (`State::ptr_eq` holds), so callers can skip downstream work.
//! - Sub-states of names that are not registered are dropped from the output.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::reducer::ReducerMap;
use super::state::{Action, State};

/// One transition function composed from named slice reducers.
#[derive(Clone, Default)]
pub struct CombinedReducer {
    reducers: Arc<ReducerMap>,
}

impl CombinedReducer {
    /// Composes the reducers in `reducers`.
    pub fn new(reducers: Arc<ReducerMap>) -> Self {
        Self { reducers }
    }

    /// Applies every slice reducer and returns the next aggregate state.
    pub fn reduce(&self, state: &State, action: &Action) -> State {
        let mut changed = state.len() != self.reducers.len();
        let mut next = BTreeMap::new();

        for (name, reducer) in self.reducers.iter() {
            let prev = state.get(name);
            let value = reducer.reduce(prev, action);
            changed |= prev != Some(&value);
            next.insert(name.clone(), value);
        }

        if changed {
            State::from_map(next)
        } else {
            state.clone()
        }
    }

    /// Slice names this reducer governs.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.reducers.keys().map(String::as_str)
    }
}
