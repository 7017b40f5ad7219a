//! # Event subscribers for the modvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`] for events broadcast through the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! ReducerManager / EffectManager / Runtime ── publish(Event) ──► Bus
//!                                                                 │
//!                                           runtime listener ◄────┘
//!                                                   │
//!                                           SubscriberSet::emit(&Event)
//!                                       ┌───────────┼───────────┐
//!                                       ▼           ▼           ▼
//!                                   LogWriter    Metrics      Custom
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
