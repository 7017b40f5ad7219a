//! # Slice reducers and their composition.
//!
//! This module provides the state-transition side of the runtime:
//! - [`State`], [`Action`] the immutable aggregate state and the dispatched action
//! - [`Reducer`], [`ReducerFn`], [`ReducerRef`] per-slice transition functions
//! - [`CombinedReducer`] one transition function built from a [`ReducerMap`]
//! - [`SliceManager`], [`ReducerManager`] runtime add/remove of named slices
//! - [`RefCountedReducerManager`] overlapping ownership of slice names
//!
//! ## Flow
//! ```text
//! feature.add("cart", r) ──► RefCountedReducerManager ──(0→1 only)──► ReducerManager
//!                                                                      ├─ reducers: ReducerMap
//!                                                                      ├─ combined: CombinedReducer
//!                                                                      └─ pending: {names to excise}
//! store.reduce(state, action) ──► excise pending ──► combined.reduce(state, action)
//! ```

mod combine;
mod manager;
mod reducer;
mod ref_counted;
mod state;

pub use combine::CombinedReducer;
pub use manager::{ReducerManager, SliceManager};
pub use reducer::{Reducer, ReducerFn, ReducerMap, ReducerRef};
pub use ref_counted::RefCountedReducerManager;
pub use state::{Action, State};
