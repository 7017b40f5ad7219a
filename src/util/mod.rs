//! # Keying and counting primitives.
//!
//! - [`ComparableMap`] associative container keyed by a caller-supplied equality relation
//! - [`RefCount`] add/remove/count contract shared by both counters
//! - [`StringRefCounter`] counts exact string keys (slice names, module ids)
//! - [`ObjectRefCounter`] counts arbitrary values compared with an [`Equality`]

mod comparable_map;
mod ref_counter;

pub use comparable_map::{ComparableMap, Equality};
pub use ref_counter::{ObjectRefCounter, RefCount, StringRefCounter};
