use std::sync::Arc;

use tokio::runtime::Handle;

use crate::{
    config::Config,
    effects::{Scheduler, TokioScheduler},
    error::RuntimeError,
    events::Bus,
    reducers::ReducerMap,
    subscribers::{Subscribe, SubscriberSet},
};

use super::runtime::Runtime;

/// Builder for constructing a [`Runtime`].
pub struct RuntimeBuilder {
    cfg: Config,
    reducers: ReducerMap,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RuntimeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            reducers: ReducerMap::new(),
            subscribers: Vec::new(),
        }
    }

    /// Sets the reducers installed before any module is mounted.
    ///
    /// Each starts with one owner, so a module that later mounts and
    /// unmounts the same name does not uninstall it.
    pub fn with_reducers(mut self, reducers: ReducerMap) -> Self {
        self.reducers = reducers;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with
    /// bounded queues; they require a tokio runtime at build time.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds a runtime whose effects run on the current tokio runtime.
    ///
    /// Fails with [`RuntimeError::NoReactor`] outside of a tokio runtime.
    pub fn build(self) -> Result<Runtime<TokioScheduler>, RuntimeError> {
        let rt = Handle::try_current().map_err(|_| RuntimeError::NoReactor)?;
        self.build_with(|bus| TokioScheduler::new(rt, bus.clone()))
    }

    /// Builds a runtime using the scheduler produced by `make`.
    ///
    /// A tokio runtime is required only when subscribers were configured.
    pub fn build_with<S, F>(self, make: F) -> Result<Runtime<S>, RuntimeError>
    where
        S: Scheduler,
        F: FnOnce(&Bus) -> S,
    {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let scheduler = make(&bus);

        let subs = if self.subscribers.is_empty() {
            None
        } else {
            let rt = Handle::try_current().map_err(|_| RuntimeError::NoReactor)?;
            let set = SubscriberSet::new(self.subscribers, &rt, bus.clone());
            Some((rt, Arc::new(set)))
        };

        Ok(Runtime::new_internal(
            self.cfg,
            bus,
            self.reducers,
            scheduler,
            subs,
        ))
    }
}
