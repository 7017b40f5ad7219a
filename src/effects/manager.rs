//! # Effect manager: one running routine per distinct descriptor.
//!
//! [`EffectManager`] starts effects through a [`Scheduler`] and keeps the
//! returned handles in a [`ComparableMap`] keyed by descriptor equality.
//!
//! ## Rules
//! - `add` starts only descriptors that are not already running.
//! - `remove` cancels and forgets handles of running descriptors; unknown
//!   descriptors are ignored, so a second remove never cancels twice.
//! - A cancel failure does not stop the remove: the rest of the batch is still
//!   cancelled, then the first failure propagates. Failing handles have
//!   already been forgotten.
//! - Routines that exit on their own keep their handle until removed.
//! - Dropping the manager cancels every registered handle.

use crate::error::EffectError;
use crate::events::{Bus, Event, EventKind};
use crate::managers::ItemManager;
use crate::util::ComparableMap;

use super::descriptor::{EffectDescriptor, equals};
use super::scheduler::{Completion, EffectHandle, Scheduler};

/// Registry of running effects.
pub struct EffectManager<S: Scheduler> {
    scheduler: S,
    tasks: ComparableMap<EffectDescriptor, S::Handle>,
    bus: Bus,
}

impl<S: Scheduler> EffectManager<S> {
    /// Creates an empty manager starting routines through `scheduler`.
    pub fn new(scheduler: S, bus: Bus) -> Self {
        Self {
            scheduler,
            tasks: ComparableMap::new(equals),
            bus,
        }
    }

    /// The scheduler used to start routines.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// True if an equal descriptor is running.
    pub fn is_running(&self, descriptor: &EffectDescriptor) -> bool {
        self.tasks.contains_key(descriptor)
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if no handle is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Requests cancellation of every registered handle and forgets them.
    ///
    /// Returns each effect's name with its completion signal so the caller can
    /// wait for them. Every handle is asked to cancel even if an earlier one
    /// fails; the first failure is returned.
    pub fn cancel_all(&mut self) -> Result<Vec<(String, Completion)>, EffectError> {
        let mut first_err = None;
        let mut pending = Vec::with_capacity(self.tasks.len());

        for (descriptor, handle) in self.tasks.drain() {
            if let Err(e) = self.cancel_handle(&descriptor, &handle) {
                first_err.get_or_insert(e);
            }
            pending.push((descriptor.name().to_string(), handle.completion()));
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(pending),
        }
    }

    fn cancel_handle(
        &self,
        descriptor: &EffectDescriptor,
        handle: &S::Handle,
    ) -> Result<(), EffectError> {
        handle.cancel()?;
        self.bus
            .publish(Event::new(EventKind::EffectCancelled).with_subject(descriptor.name()));
        Ok(())
    }
}

impl<S: Scheduler> Drop for EffectManager<S> {
    fn drop(&mut self) {
        if let Err(e) = self.cancel_all() {
            tracing::warn!(error = %e, "effect cancel failed while dropping manager");
        }
    }
}

impl<S: Scheduler> ItemManager<EffectDescriptor> for EffectManager<S> {
    type Error = EffectError;

    fn items(&self) -> Vec<EffectDescriptor> {
        self.tasks.keys()
    }

    fn add(&mut self, items: &[EffectDescriptor]) {
        for descriptor in items {
            if self.tasks.contains_key(descriptor) {
                continue;
            }
            let handle = self.scheduler.run(
                descriptor.effect().clone(),
                descriptor.argument().cloned(),
            );
            self.tasks.add(descriptor.clone(), handle);
            self.bus
                .publish(Event::new(EventKind::EffectStarted).with_subject(descriptor.name()));
        }
    }

    fn remove(&mut self, items: &[EffectDescriptor]) -> Result<(), EffectError> {
        let mut first_err = None;
        for descriptor in items {
            if let Some(handle) = self.tasks.remove(descriptor) {
                if let Err(e) = self.cancel_handle(descriptor, &handle) {
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording scheduler shared by manager and runtime tests.

    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use crate::effects::{Completion, EffectHandle, EffectRef, Scheduler};
    use crate::error::EffectError;

    #[derive(Default)]
    pub struct Journal {
        pub started: Vec<(String, Option<Value>)>,
        pub cancelled: Vec<String>,
    }

    /// Scheduler that records starts and cancels without running anything.
    #[derive(Clone, Default)]
    pub struct MockScheduler {
        pub journal: Arc<Mutex<Journal>>,
        pub reject_cancel: bool,
        /// Rejects cancellation only for effects with this name.
        pub reject_named: Option<&'static str>,
    }

    pub struct MockHandle {
        name: String,
        journal: Arc<Mutex<Journal>>,
        reject: bool,
        completion: Completion,
    }

    impl MockScheduler {
        pub fn started(&self) -> usize {
            self.journal.lock().unwrap().started.len()
        }

        pub fn cancelled(&self) -> Vec<String> {
            self.journal.lock().unwrap().cancelled.clone()
        }
    }

    impl Scheduler for MockScheduler {
        type Handle = MockHandle;

        fn run(&self, effect: EffectRef, argument: Option<Value>) -> MockHandle {
            let name = effect.name().to_string();
            self.journal
                .lock()
                .unwrap()
                .started
                .push((name.clone(), argument));
            let reject = self.reject_cancel || self.reject_named == Some(name.as_str());
            MockHandle {
                name,
                journal: Arc::clone(&self.journal),
                reject,
                completion: Completion::new(),
            }
        }
    }

    impl EffectHandle for MockHandle {
        fn cancel(&self) -> Result<(), EffectError> {
            if self.reject {
                return Err(EffectError::CancelRejected {
                    effect: self.name.clone(),
                    reason: "scheduler closed".into(),
                });
            }
            self.journal.lock().unwrap().cancelled.push(self.name.clone());
            self.completion.complete();
            Ok(())
        }

        fn completion(&self) -> Completion {
            self.completion.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockScheduler;
    use super::*;
    use crate::effects::{EffectFn, EffectRef};
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;

    fn routine(name: &'static str) -> EffectRef {
        EffectFn::arc(name, |_ctx: CancellationToken, _arg: Option<Value>| async {
            Ok::<_, EffectError>(())
        })
    }

    #[test]
    fn adding_a_running_descriptor_again_starts_nothing() {
        let sched = MockScheduler::default();
        let mut em = EffectManager::new(sched.clone(), Bus::new(16));
        let d = EffectDescriptor::new(routine("sync"));

        em.add(&[d.clone()]);
        em.add(&[d.clone()]);

        assert_eq!(sched.started(), 1);
        assert_eq!(em.items(), vec![d]);
    }

    #[test]
    fn second_remove_does_not_cancel_again() {
        let sched = MockScheduler::default();
        let mut em = EffectManager::new(sched.clone(), Bus::new(16));
        let d = EffectDescriptor::new(routine("sync"));

        em.add(&[d.clone()]);
        em.remove(&[d.clone()]).unwrap();
        em.remove(&[d.clone()]).unwrap();

        assert_eq!(sched.cancelled(), vec!["sync".to_string()]);
        assert!(em.is_empty());
    }

    #[test]
    fn bound_arguments_distinguish_descriptors() {
        let sched = MockScheduler::default();
        let mut em = EffectManager::new(sched.clone(), Bus::new(16));
        let f = routine("fetch");

        em.add(&[
            EffectDescriptor::with_argument(f.clone(), json!(1)),
            EffectDescriptor::with_argument(f.clone(), json!(2)),
        ]);
        assert_eq!(em.len(), 2);

        em.remove(&[EffectDescriptor::with_argument(f.clone(), json!(1))]).unwrap();
        assert!(em.is_running(&EffectDescriptor::with_argument(f.clone(), json!(2))));
        assert!(!em.is_running(&EffectDescriptor::with_argument(f, json!(1))));

        let journal = sched.journal.lock().unwrap();
        assert_eq!(journal.started, vec![
            ("fetch".to_string(), Some(json!(1))),
            ("fetch".to_string(), Some(json!(2))),
        ]);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let sched = MockScheduler::default();
        let mut em = EffectManager::new(sched.clone(), Bus::new(16));
        em.add(&[]);
        em.remove(&[]).unwrap();
        assert_eq!(sched.started(), 0);
    }

    #[test]
    fn cancel_failure_propagates() {
        let sched = MockScheduler {
            reject_cancel: true,
            ..MockScheduler::default()
        };
        let mut em = EffectManager::new(sched, Bus::new(16));
        let d = EffectDescriptor::new(routine("stuck"));
        em.add(&[d.clone()]);

        let err = em.remove(&[d.clone()]).unwrap_err();
        assert_eq!(err.as_label(), "effect_cancel_rejected");
        // handle is forgotten either way
        assert!(!em.is_running(&d));
    }

    #[test]
    fn cancel_all_drains_and_reports_completions() {
        let sched = MockScheduler::default();
        let mut em = EffectManager::new(sched.clone(), Bus::new(16));
        em.add(&[
            EffectDescriptor::new(routine("a")),
            EffectDescriptor::new(routine("b")),
        ]);

        let pending = em.cancel_all().unwrap();

        assert!(em.is_empty());
        let names: Vec<_> = pending.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(pending.iter().all(|(_, c)| c.is_complete()));
    }

    #[test]
    fn remove_keeps_cancelling_after_a_failure() {
        let sched = MockScheduler {
            reject_named: Some("a"),
            ..MockScheduler::default()
        };
        let mut em = EffectManager::new(sched.clone(), Bus::new(16));
        let a = EffectDescriptor::new(routine("a"));
        let b = EffectDescriptor::new(routine("b"));
        em.add(&[a.clone(), b.clone()]);

        let err = em.remove(&[a, b]).unwrap_err();

        assert!(matches!(err, EffectError::CancelRejected { ref effect, .. } if effect == "a"));
        assert_eq!(sched.cancelled(), vec!["b".to_string()]);
        assert!(em.is_empty());
    }

    #[test]
    fn dropping_the_manager_cancels_running_effects() {
        let sched = MockScheduler::default();
        let mut em = EffectManager::new(sched.clone(), Bus::new(16));
        em.add(&[
            EffectDescriptor::new(routine("a")),
            EffectDescriptor::new(routine("b")),
        ]);

        drop(em);

        assert_eq!(sched.cancelled(), vec!["a".to_string(), "b".to_string()]);
    }
}
