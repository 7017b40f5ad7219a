//! # Runtime events emitted by the managers, effects and runtime.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Slice events**: reducer registration and state excision
//! - **Effect events**: background routine start, cancellation and exit
//! - **Module events**: feature mount/unmount and runtime shutdown
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries the subject name (slice, effect, module or
//! subscriber) and an optional reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use modvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::EffectFailed)
//!     .with_subject("poller")
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::EffectFailed);
//! assert_eq!(ev.subject.as_deref(), Some("poller"));
//! assert_eq!(ev.reason.as_deref(), Some("connection refused"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Slice events ===
    /// A slice reducer was installed in the composed reducer.
    ///
    /// Sets:
    /// - `subject`: slice name
    SliceAdded,

    /// A slice reducer was uninstalled; its data is now pending excision.
    ///
    /// Sets:
    /// - `subject`: slice name
    SliceRemoved,

    /// Pending slices were deleted from the aggregate state during `reduce`.
    ///
    /// Sets:
    /// - `reason`: comma-separated slice names
    SlicesExcised,

    // === Effect events ===
    /// An effect routine was started by the effect manager.
    ///
    /// Sets:
    /// - `subject`: effect name
    EffectStarted,

    /// Cancellation was requested for a running effect.
    ///
    /// Sets:
    /// - `subject`: effect name
    EffectCancelled,

    /// Effect routine returned `Ok` or exited on cancellation.
    ///
    /// Sets:
    /// - `subject`: effect name
    EffectStopped,

    /// Effect routine returned an error or panicked.
    ///
    /// Sets:
    /// - `subject`: effect name
    /// - `reason`: failure message
    EffectFailed,

    // === Module events ===
    /// A feature module was mounted on the runtime.
    ///
    /// Sets:
    /// - `subject`: module id
    ModuleMounted,

    /// A feature module was unmounted from the runtime.
    ///
    /// Sets:
    /// - `subject`: module id
    ModuleUnmounted,

    // === Shutdown events ===
    /// Runtime shutdown started.
    ShutdownRequested,

    /// All cancelled effects stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some effects did not stop in time.
    ///
    /// Sets:
    /// - `reason`: comma-separated names of stuck effects
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Slice name, effect name, module id or subscriber name.
    pub subject: Option<Arc<str>>,
    /// Human-readable reason (errors, excised names, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subject: None,
            reason: None,
        }
    }

    /// Attaches a subject name.
    #[inline]
    pub fn with_subject(mut self, subject: impl Into<Arc<str>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subject(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subject(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::ModuleMounted);
        let b = Event::new(EventKind::ModuleUnmounted);
        assert!(b.seq > a.seq);
    }
}
