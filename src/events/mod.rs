//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the reducer manager, the effect
//! manager, the tokio scheduler, the runtime and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ReducerManager`, `EffectManager`, `TokioScheduler` routines,
//!   `Runtime` (mount/unmount/shutdown).
//! - **Consumers**: the runtime listener that fans out to `SubscriberSet`, or any
//!   caller holding a receiver from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
