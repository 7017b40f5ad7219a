//! # Effect abstraction and function-backed implementation.
//!
//! An [`Effect`] is a long-running background routine. It receives a
//! [`CancellationToken`] and the descriptor's bound argument, and should check
//! the token regularly to stop cooperatively once its descriptor is removed.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use modvisor::{EffectError, EffectFn, EffectRef};
//!
//! let poller: EffectRef = EffectFn::arc("poller", |ctx: CancellationToken, _arg| async move {
//!     while !ctx.is_cancelled() {
//!         tokio::time::sleep(std::time::Duration::from_millis(50)).await;
//!     }
//!     Ok::<_, EffectError>(())
//! });
//!
//! assert_eq!(poller.name(), "poller");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::EffectError;

/// # Asynchronous, cancellable background routine.
#[async_trait]
pub trait Effect: Send + Sync + 'static {
    /// Returns a stable, human-readable name used in events and logs.
    fn name(&self) -> &str;

    /// Runs the routine until it finishes or `ctx` is cancelled.
    ///
    /// `argument` is the value bound by the descriptor, if any.
    async fn run(&self, ctx: CancellationToken, argument: Option<Value>) -> Result<(), EffectError>;
}

/// Shared handle to an effect routine. Descriptor identity is the `Arc` allocation.
pub type EffectRef = Arc<dyn Effect>;

/// Function-backed effect.
///
/// Wraps a closure that *creates* a new future per start.
pub struct EffectFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut> EffectFn<F>
where
    F: Fn(CancellationToken, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), EffectError>> + Send + 'static,
{
    /// Creates a new function-backed effect.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the effect and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Effect for EffectFn<F>
where
    F: Fn(CancellationToken, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), EffectError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken, argument: Option<Value>) -> Result<(), EffectError> {
        (self.f)(ctx, argument).await
    }
}

impl<F> fmt::Debug for EffectFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectFn").field("name", &self.name).finish()
    }
}
