//! # LogWriter: tracing-backed event writer
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Install a `tracing` subscriber (e.g. `tracing-subscriber`) to see output.
//!
//! ## Example output
//! ```text
//! INFO  slice added slice="cart"
//! INFO  effect started effect="cart-sync"
//! WARN  effect failed effect="cart-sync" reason="connection refused"
//! INFO  slices excised slices="cart"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let subject = e.subject.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::SliceAdded => tracing::info!(slice = subject, "slice added"),
            EventKind::SliceRemoved => tracing::info!(slice = subject, "slice removed"),
            EventKind::SlicesExcised => tracing::info!(slices = reason, "slices excised"),
            EventKind::EffectStarted => tracing::info!(effect = subject, "effect started"),
            EventKind::EffectCancelled => tracing::info!(effect = subject, "effect cancelled"),
            EventKind::EffectStopped => tracing::debug!(effect = subject, "effect stopped"),
            EventKind::EffectFailed => {
                tracing::warn!(effect = subject, reason, "effect failed")
            }
            EventKind::ModuleMounted => tracing::info!(module = subject, "module mounted"),
            EventKind::ModuleUnmounted => tracing::info!(module = subject, "module unmounted"),
            EventKind::ShutdownRequested => tracing::info!("shutdown requested"),
            EventKind::AllStoppedWithin => tracing::info!("all effects stopped within grace"),
            EventKind::GraceExceeded => tracing::warn!(stuck = reason, "grace exceeded"),
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = subject, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(subscriber = subject, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
