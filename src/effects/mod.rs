//! # Background effects: routines, descriptors, scheduling and management.
//!
//! This module provides the effect side of the runtime:
//! - [`Effect`] trait for async cancellable routines, [`EffectFn`] closure adapter
//! - [`EffectDescriptor`] routine plus optional bound argument, compared structurally
//! - [`Scheduler`] / [`EffectHandle`] / [`Completion`] the start/cancel capability
//! - [`TokioScheduler`] scheduler spawning routines on a tokio runtime
//! - [`EffectManager`] one running instance per distinct descriptor
//!
//! ## Lifecycle per descriptor
//! ```text
//! unregistered ──add──► running ──remove──► unregistered
//!                          │
//!                          └─ routine exits on its own: handle stays registered
//!                             until an explicit remove
//! ```

mod descriptor;
mod effect;
mod manager;
mod scheduler;

pub use descriptor::{EffectDescriptor, equals};
pub use effect::{Effect, EffectFn, EffectRef};
pub use manager::EffectManager;
pub use scheduler::{Completion, EffectHandle, EffectTask, Scheduler, TokioScheduler};

#[cfg(test)]
pub(crate) use manager::testing;
