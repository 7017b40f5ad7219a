//! # Event bus.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] sender. The reducer manager, the
//! effect manager and the runtime publish synchronously from `&mut self`
//! methods, and spawned effect routines publish when they exit; none of them
//! waits on a receiver.
//!
//! ```text
//! ReducerManager ─┐
//! EffectManager  ─┤
//! TokioScheduler ─┼──► Bus ──► runtime listener ──► SubscriberSet
//! Runtime        ─┘      └───► Bus::subscribe() (tests, custom listeners)
//! ```
//!
//! Events published while nobody is subscribed are lost. A receiver that
//! falls more than the capacity behind gets `RecvError::Lagged` and resumes
//! from the oldest retained event.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the runtime's event channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Sends `ev` to current receivers. Never blocks.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
