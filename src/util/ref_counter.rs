//! # Reference counters.
//!
//! A counter records how many owners currently want a key installed. It holds
//! no business data and is consulted by the ref-counted decorators to decide
//! whether an add/remove reaches the wrapped manager.
//!
//! ## Rules
//! - A key absent from the counter reads as `0`.
//! - `add` creates the entry at `1` or increments it.
//! - `remove` on an absent key is a no-op; reaching `0` drops the entry.
//! - Counts never go negative.

use std::collections::HashMap;

use super::comparable_map::{ComparableMap, Equality};

/// Add/remove/count contract shared by the counters.
pub trait RefCount<K: ?Sized> {
    /// Records one more owner of `key`.
    fn add(&mut self, key: &K);

    /// Releases one owner of `key`; no-op when `key` has no owners.
    fn remove(&mut self, key: &K);

    /// Current number of owners of `key`.
    fn count(&self, key: &K) -> usize;
}

/// Counter keyed by exact string value.
#[derive(Debug, Default, Clone)]
pub struct StringRefCounter {
    counts: HashMap<String, usize>,
}

impl StringRefCounter {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns sorted keys with a non-zero count.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.counts.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

impl RefCount<str> for StringRefCounter {
    fn add(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    fn remove(&mut self, key: &str) {
        if let Some(count) = self.counts.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(key);
            }
        }
    }

    fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }
}

/// Counter keyed by an arbitrary value compared with an [`Equality`].
pub struct ObjectRefCounter<T> {
    counts: ComparableMap<T, usize>,
}

impl<T> ObjectRefCounter<T> {
    /// Creates an empty counter comparing keys with `eq`.
    pub fn new(eq: Equality<T>) -> Self {
        Self {
            counts: ComparableMap::new(eq),
        }
    }

    /// Number of distinct keys with a non-zero count.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no key has owners.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<T: Clone> RefCount<T> for ObjectRefCounter<T> {
    fn add(&mut self, key: &T) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.add(key.clone(), 1);
            }
        }
    }

    fn remove(&mut self, key: &T) {
        let drained = match self.counts.get_mut(key) {
            Some(count) => {
                *count -= 1;
                *count == 0
            }
            None => false,
        };
        if drained {
            self.counts.remove(key);
        }
    }

    fn count(&self, key: &T) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }
}
