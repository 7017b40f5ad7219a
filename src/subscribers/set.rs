//! # Subscriber fan-out.
//!
//! [`SubscriberSet`] owns one bounded queue and one worker task per
//! [`Subscribe`] implementation. The runtime listener hands it every bus event
//! through [`SubscriberSet::emit`], which only enqueues.
//!
//! A full or closed queue drops the event for that subscriber and publishes
//! `SubscriberOverflow` (never for an overflow event itself, so a stuck
//! subscriber cannot feed its own queue). A panic in `on_event` is logged,
//! published as `SubscriberPanicked`, and the worker moves on to the next event.
//!
//! Order is FIFO per subscriber only. [`SubscriberSet::shutdown`] closes the
//! queues and waits until every worker has drained what was already enqueued.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};

use super::Subscribe;

/// Sending side of one subscriber's queue.
struct Queue {
    subscriber: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Bounded per-subscriber queues and their workers.
pub struct SubscriberSet {
    queues: Vec<Queue>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber on `rt`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, rt: &Handle, bus: Bus) -> Self {
        let (queues, workers): (Vec<Queue>, Vec<JoinHandle<()>>) = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let queue = Queue {
                    subscriber: sub.name(),
                    tx,
                };
                (queue, rt.spawn(deliver(sub, rx, bus.clone())))
            })
            .unzip();

        Self {
            queues,
            workers,
            bus,
        }
    }

    /// Enqueues `event` for every subscriber without waiting.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());
        for queue in &self.queues {
            let reason = match queue.tx.try_send(Arc::clone(&shared)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            tracing::warn!(subscriber = queue.subscriber, reason, "subscriber dropped event");
            if event.kind != EventKind::SubscriberOverflow {
                self.bus
                    .publish(Event::subscriber_overflow(queue.subscriber, reason));
            }
        }
    }

    /// Closes the queues and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.queues);
        futures::future::join_all(self.workers).await;
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.len()
    }
}

/// Worker loop: runs `on_event` for each queued event until the queue closes.
async fn deliver(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
            .catch_unwind()
            .await;
        if let Err(payload) = handled {
            let info = panic_message(payload.as_ref());
            tracing::error!(subscriber = sub.name(), info = %info, "subscriber panicked");
            bus.publish(Event::subscriber_panicked(sub.name(), info));
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
