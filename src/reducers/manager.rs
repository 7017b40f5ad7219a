//! # Reducer manager: runtime add/remove of named slices.
//!
//! [`ReducerManager`] holds the registered [`ReducerMap`], the
//! [`CombinedReducer`] derived from it, and the set of slice names whose data
//! must be excised from the aggregate state.
//!
//! ## Rules
//! - `add` ignores empty names and names that are already registered.
//! - `remove` ignores empty and unknown names.
//! - Every successful add/remove rebuilds the combined reducer.
//! - Excision is deferred: a removed name is deleted from the state by the
//!   next `reduce`, exactly once, before the combined reducer runs.
//!
//! ## Example
//! ```rust
//! use modvisor::{Action, Bus, ReducerFn, ReducerManager, ReducerMap, SliceManager, State};
//! use serde_json::json;
//!
//! let mut rm = ReducerManager::new(ReducerMap::new(), Bus::new(16));
//! rm.add("flag", ReducerFn::arc(|_, _| json!(true)));
//!
//! let state = rm.reduce(&State::new(), &Action::new("@@init"));
//! assert_eq!(state.get("flag"), Some(&json!(true)));
//!
//! rm.remove("flag");
//! let state = rm.reduce(&state, &Action::new("next"));
//! assert!(state.is_empty());
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::events::{Bus, Event, EventKind};

use super::combine::CombinedReducer;
use super::reducer::{ReducerMap, ReducerRef};
use super::state::{Action, State};

/// Key-oriented manager contract shared by [`ReducerManager`] and its
/// ref-counted decorator.
pub trait SliceManager {
    /// Computes the next aggregate state.
    fn reduce(&mut self, state: &State, action: &Action) -> State;

    /// Snapshot of the registered reducers.
    fn reducer_map(&self) -> Arc<ReducerMap>;

    /// Registers `reducer` under `key`.
    fn add(&mut self, key: &str, reducer: ReducerRef);

    /// Unregisters `key`.
    fn remove(&mut self, key: &str);
}

/// Dynamic set of named reducers composed into one.
pub struct ReducerManager {
    reducers: Arc<ReducerMap>,
    combined: CombinedReducer,
    pending: BTreeSet<String>,
    bus: Bus,
}

impl ReducerManager {
    /// Creates a manager seeded with `initial` reducers.
    pub fn new(initial: ReducerMap, bus: Bus) -> Self {
        let reducers = Arc::new(initial);
        Self {
            combined: CombinedReducer::new(Arc::clone(&reducers)),
            reducers,
            pending: BTreeSet::new(),
            bus,
        }
    }

    /// Slice names awaiting excision by the next `reduce`.
    pub fn pending_removals(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    fn rebuild(&mut self, reducers: ReducerMap) {
        self.reducers = Arc::new(reducers);
        self.combined = CombinedReducer::new(Arc::clone(&self.reducers));
    }

    /// Deletes pending slices from `state`, producing a new value.
    fn excise(&mut self, state: &State) -> State {
        let pending = std::mem::take(&mut self.pending);
        let names: Vec<&str> = pending.iter().map(String::as_str).collect();
        self.bus.publish(
            Event::new(EventKind::SlicesExcised).with_reason(names.join(",")),
        );
        state.without(&names)
    }
}

impl SliceManager for ReducerManager {
    fn reduce(&mut self, state: &State, action: &Action) -> State {
        if self.pending.is_empty() {
            return self.combined.reduce(state, action);
        }
        let excised = self.excise(state);
        self.combined.reduce(&excised, action)
    }

    fn reducer_map(&self) -> Arc<ReducerMap> {
        Arc::clone(&self.reducers)
    }

    fn add(&mut self, key: &str, reducer: ReducerRef) {
        if key.is_empty() || self.reducers.contains_key(key) {
            return;
        }

        let mut next = (*self.reducers).clone();
        next.insert(key.to_string(), reducer);
        self.rebuild(next);

        self.bus
            .publish(Event::new(EventKind::SliceAdded).with_subject(key));
    }

    fn remove(&mut self, key: &str) {
        if key.is_empty() || !self.reducers.contains_key(key) {
            return;
        }

        let mut next = (*self.reducers).clone();
        next.remove(key);
        self.rebuild(next);
        self.pending.insert(key.to_string());

        self.bus
            .publish(Event::new(EventKind::SliceRemoved).with_subject(key));
    }
}
