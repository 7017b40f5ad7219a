//! # Reference-counted reducer manager.
//!
//! [`RefCountedReducerManager`] wraps any [`SliceManager`] so that several
//! features can own the same slice name. The wrapped manager sees an `add` only
//! when a name goes from zero owners to one, and a `remove` only when the last
//! owner releases it.
//!
//! ```text
//! add(k):    count(k) == 0 ? inner.add(k) : skip;   count(k) += 1
//! remove(k): count(k) == 0 ? skip : count(k) -= 1;  count(k) == 0 ? inner.remove(k) : skip
//! ```
//!
//! The counter is seeded from the wrapped manager's current reducers at
//! construction, so already-installed slices start with one owner.

use std::sync::Arc;

use crate::util::{RefCount, StringRefCounter};

use super::manager::SliceManager;
use super::reducer::{ReducerMap, ReducerRef};
use super::state::{Action, State};

/// [`SliceManager`] decorator that installs on 0→1 and uninstalls on 1→0.
pub struct RefCountedReducerManager<M> {
    inner: M,
    counter: StringRefCounter,
}

impl<M: SliceManager> RefCountedReducerManager<M> {
    /// Wraps `inner`, counting one owner per already-registered slice.
    pub fn new(inner: M) -> Self {
        let mut counter = StringRefCounter::new();
        for key in inner.reducer_map().keys() {
            counter.add(key.as_str());
        }
        Self { inner, counter }
    }

    /// Current number of owners of `key`.
    pub fn count(&self, key: &str) -> usize {
        self.counter.count(key)
    }

    /// The wrapped manager.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: SliceManager> SliceManager for RefCountedReducerManager<M> {
    fn reduce(&mut self, state: &State, action: &Action) -> State {
        self.inner.reduce(state, action)
    }

    fn reducer_map(&self) -> Arc<ReducerMap> {
        self.inner.reducer_map()
    }

    fn add(&mut self, key: &str, reducer: ReducerRef) {
        if key.is_empty() {
            return;
        }
        if self.counter.count(key) == 0 {
            self.inner.add(key, reducer);
        }
        self.counter.add(key);
        tracing::trace!(slice = key, owners = self.counter.count(key), "slice acquired");
    }

    fn remove(&mut self, key: &str) {
        if key.is_empty() || self.counter.count(key) == 0 {
            return;
        }
        self.counter.remove(key);
        let owners = self.counter.count(key);
        tracing::trace!(slice = key, owners, "slice released");
        if owners == 0 {
            self.inner.remove(key);
        }
    }
}
