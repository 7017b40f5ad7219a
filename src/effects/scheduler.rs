//! # Scheduling capability for effect routines.
//!
//! The effect manager never runs routines itself; it asks a [`Scheduler`] to
//! start one and keeps the returned [`EffectHandle`]. A handle can request
//! cancellation and exposes a [`Completion`] signal, but the manager only ever
//! requests; it does not wait for the routine to stop.
//!
//! [`TokioScheduler`] is the production scheduler:
//! ```text
//! run(effect, arg)
//!   ├─► child token = root.child_token()
//!   ├─► rt.spawn(async {
//!   │       effect.run(child, arg)  (panics caught)
//!   │       ├─ Ok / Canceled ─► publish EffectStopped
//!   │       └─ Err / panic   ─► publish EffectFailed
//!   │       completion.complete()   (also on drop)
//!   │   })
//!   └─► EffectTask { token, completion, join }
//! ```
//!
//! ## Rules
//! - Cancelling a handle cancels only its own child token.
//! - Cancelling the scheduler's root token (runtime shutdown) reaches every routine.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{EffectError, RuntimeError};
use crate::events::{Bus, Event, EventKind};

use super::effect::EffectRef;

/// Starts effect routines.
pub trait Scheduler {
    /// Handle type returned for each started routine.
    type Handle: EffectHandle;

    /// Starts `effect`, passing `argument` when the descriptor binds one.
    fn run(&self, effect: EffectRef, argument: Option<Value>) -> Self::Handle;
}

/// Handle to a started routine.
pub trait EffectHandle {
    /// Requests cooperative cancellation. Does not wait for the routine to stop.
    fn cancel(&self) -> Result<(), EffectError>;

    /// Signal resolved once the routine has exited.
    fn completion(&self) -> Completion;
}

/// Clonable completion signal of a routine.
#[derive(Clone, Debug, Default)]
pub struct Completion {
    token: CancellationToken,
}

impl Completion {
    /// Creates an unresolved signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the signal. Idempotent.
    pub fn complete(&self) {
        self.token.cancel();
    }

    /// True once resolved.
    pub fn is_complete(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until resolved.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

/// Handle returned by [`TokioScheduler`].
pub struct EffectTask {
    name: Arc<str>,
    token: CancellationToken,
    completion: Completion,
    join: JoinHandle<()>,
}

impl EffectTask {
    /// Name of the running effect.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the spawned tokio task has finished.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl EffectHandle for EffectTask {
    fn cancel(&self) -> Result<(), EffectError> {
        self.token.cancel();
        Ok(())
    }

    fn completion(&self) -> Completion {
        self.completion.clone()
    }
}

impl fmt::Debug for EffectTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectTask")
            .field("name", &self.name)
            .field("cancelled", &self.token.is_cancelled())
            .field("complete", &self.completion.is_complete())
            .finish()
    }
}

/// Scheduler spawning routines on a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    rt: Handle,
    root: CancellationToken,
    bus: Bus,
}

impl TokioScheduler {
    /// Creates a scheduler spawning on `rt` and publishing exits to `bus`.
    pub fn new(rt: Handle, bus: Bus) -> Self {
        Self {
            rt,
            root: CancellationToken::new(),
            bus,
        }
    }

    /// Creates a scheduler for the tokio runtime the caller runs in.
    ///
    /// Fails with [`RuntimeError::NoReactor`] outside of a tokio runtime.
    pub fn current(bus: Bus) -> Result<Self, RuntimeError> {
        let rt = Handle::try_current().map_err(|_| RuntimeError::NoReactor)?;
        Ok(Self::new(rt, bus))
    }

    /// Root token; its children are handed to every started routine.
    pub fn root_token(&self) -> &CancellationToken {
        &self.root
    }
}

impl Scheduler for TokioScheduler {
    type Handle = EffectTask;

    fn run(&self, effect: EffectRef, argument: Option<Value>) -> EffectTask {
        let name: Arc<str> = Arc::from(effect.name());
        let token = self.root.child_token();
        let completion = Completion::new();

        let ctx = token.clone();
        let bus = self.bus.clone();
        let task_name = Arc::clone(&name);
        let done = completion.token.clone().drop_guard();

        let join = self.rt.spawn(async move {
            let _done = done;
            let res = std::panic::AssertUnwindSafe(effect.run(ctx, argument))
                .catch_unwind()
                .await;
            let ev = match res {
                Ok(Ok(())) | Ok(Err(EffectError::Canceled)) => {
                    Event::new(EventKind::EffectStopped).with_subject(task_name)
                }
                Ok(Err(e)) => Event::new(EventKind::EffectFailed)
                    .with_subject(task_name)
                    .with_reason(e.to_string()),
                Err(_panic) => Event::new(EventKind::EffectFailed)
                    .with_subject(task_name)
                    .with_reason("effect_panic"),
            };
            bus.publish(ev);
        });

        EffectTask {
            name,
            token,
            completion,
            join,
        }
    }
}
