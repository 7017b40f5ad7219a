//! # Map keyed by value equality.
//!
//! [`ComparableMap`] stores entries in insertion order and finds keys by
//! linear scan with the equality relation supplied at construction. Keys
//! such as effect descriptors have no hash or order, and the number of
//! distinct live keys (running effects, counted descriptors) stays small.
//!
//! ## Example
//! ```rust
//! use modvisor::ComparableMap;
//!
//! fn same_name(a: &String, b: &String) -> bool {
//!     a.eq_ignore_ascii_case(b)
//! }
//!
//! let mut map = ComparableMap::new(same_name);
//! map.add("Cart".to_string(), 1);
//! assert_eq!(map.get(&"cart".to_string()), Some(&1));
//! assert_eq!(map.remove(&"CART".to_string()), Some(1));
//! assert!(map.is_empty());
//! ```

use std::fmt;

/// Equality relation used to key a [`ComparableMap`].
pub type Equality<K> = fn(&K, &K) -> bool;

/// Associative container keyed by an explicit equality relation.
pub struct ComparableMap<K, V> {
    entries: Vec<(K, V)>,
    eq: Equality<K>,
}

impl<K, V> ComparableMap<K, V> {
    /// Creates an empty map using `eq` to compare keys.
    pub fn new(eq: Equality<K>) -> Self {
        Self {
            entries: Vec::new(),
            eq,
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| (self.eq)(k, key))
    }

    /// Inserts `value` under `key`, returning the value previously stored under an equal key.
    ///
    /// The originally stored key instance is kept when an equal key already exists.
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns the value stored under a key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.position(key).map(move |idx| &mut self.entries[idx].1)
    }

    /// Returns true if a key equal to `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Removes the entry for a key equal to `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    /// Iterates over stored keys.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Removes and returns every entry.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        std::mem::take(&mut self.entries)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Clone, V> ComparableMap<K, V> {
    /// Returns a snapshot of the stored keys.
    pub fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ComparableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
