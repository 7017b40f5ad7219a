//! # Subscribe: observing slice, effect and module events.
//!
//! A [`Subscribe`] implementation is handed to
//! [`RuntimeBuilder::with_subscribers`](crate::RuntimeBuilder::with_subscribers)
//! and then sees every [`Event`] the managers and the runtime publish: slices
//! added, removed and excised, effects started, cancelled and exited, modules
//! mounted and unmounted, and the shutdown outcome.
//!
//! Delivery runs on a worker task owned by the [`SubscriberSet`](crate::SubscriberSet).
//! Each subscriber has its own bounded queue sized by [`Subscribe::queue_capacity`];
//! when it is full the event is dropped for that subscriber only and a
//! `SubscriberOverflow` event is published. A panicking `on_event` is reported
//! as `SubscriberPanicked` and the worker keeps going.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use async_trait::async_trait;
//! use modvisor::{Event, EventKind, Subscribe};
//!
//! /// Counts slices currently installed.
//! #[derive(Default)]
//! struct SliceGauge(AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for SliceGauge {
//!     async fn on_event(&self, ev: &Event) {
//!         match ev.kind {
//!             EventKind::SliceAdded => { self.0.fetch_add(1, Ordering::Relaxed); }
//!             EventKind::SliceRemoved => { self.0.fetch_sub(1, Ordering::Relaxed); }
//!             _ => {}
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "slice-gauge" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of runtime events.
///
/// `on_event` runs on the subscriber's own worker, so slow work only backs up
/// this subscriber's queue. It should not block the executor.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event, in publish order.
    async fn on_event(&self, event: &Event);

    /// Name reported as the subject of overflow and panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue size for this subscriber, at least 1.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
