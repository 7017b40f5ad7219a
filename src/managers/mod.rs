//! # Item-oriented managers and their ref-counted decorator.
//!
//! - [`ItemManager`] the `items / add / remove` contract of list-based managers
//! - [`RefCountedManager`] decorator forwarding only first adds and last removes
//!
//! [`EffectManager`](crate::EffectManager) is the built-in `ItemManager`; the
//! key-oriented counterpart for slices lives in [`RefCountedReducerManager`](crate::RefCountedReducerManager).

mod item;
mod ref_counted;

pub use item::ItemManager;
pub use ref_counted::RefCountedManager;
