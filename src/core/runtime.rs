//! # Runtime: the capability object handed to feature modules.
//!
//! The [`Runtime`] owns one ref-counted reducer manager, one ref-counted
//! effect manager and the event bus. Features receive `&mut Runtime` at
//! mount time; nothing is global, and each runtime's managers live as long
//! as the runtime itself.
//!
//! ## Architecture
//! ```text
//! mount(module) ──► RefCountedReducerManager ──(0→1)──► ReducerManager ──► SliceAdded
//!               └─► RefCountedManager ─────────(0→1)──► EffectManager ───► Scheduler::run
//!
//! unmount(module) ─► same path, forwarding only 1→0 transitions
//!
//! store ──► reduce(state, action) ──► ReducerManager::reduce (excise + combine)
//!
//! Bus ──► listener ──► SubscriberSet ──► subscriber workers
//! ```
//!
//! ## Shutdown path
//! ```text
//! shutdown()
//!   ├─► publish ShutdownRequested
//!   ├─► EffectManager::cancel_all()           (every running effect)
//!   ├─► wait for completions up to cfg.grace
//!   │     ├─ all done  → publish AllStoppedWithin
//!   │     └─ timed out → publish GraceExceeded, return RuntimeError::GraceExceeded
//!   └─► stop listener, drain subscriber queues
//! ```
//!
//! ## Concurrency
//! All registration calls take `&mut self` and run to completion synchronously.
//! Hosts that mount from several threads wrap the runtime in their own mutex.
//!
//! ## Example
//! ```rust
//! use modvisor::{Action, Config, FeatureModule, ReducerFn, Runtime, State};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut rt = Runtime::builder(Config::default()).build()?;
//!
//!     let counter = FeatureModule::new("counter")
//!         .with_reducer("count", ReducerFn::arc(|state, action| {
//!             let n = state.and_then(|v| v.as_i64()).unwrap_or(0);
//!             json!(if action.is("inc") { n + 1 } else { n })
//!         }));
//!
//!     rt.mount(&counter);
//!     let state = rt.reduce(&State::new(), &Action::new("inc"));
//!     assert_eq!(state.get("count"), Some(&json!(1)));
//!
//!     rt.unmount(&counter)?;
//!     assert!(rt.reduce(&state, &Action::new("inc")).is_empty());
//!
//!     rt.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    effects::{Completion, EffectDescriptor, EffectManager, Scheduler, TokioScheduler, equals},
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    managers::{ItemManager, RefCountedManager},
    reducers::{
        Action, ReducerManager, ReducerMap, RefCountedReducerManager, SliceManager, State,
    },
    subscribers::SubscriberSet,
    util::{RefCount, StringRefCounter},
};

use super::builder::RuntimeBuilder;
use super::module::FeatureModule;

/// Ref-counted reducer and effect managers plus event wiring.
pub struct Runtime<S: Scheduler = TokioScheduler> {
    cfg: Config,
    bus: Bus,
    reducers: RefCountedReducerManager<ReducerManager>,
    effects: RefCountedManager<EffectDescriptor, EffectManager<S>>,
    modules: StringRefCounter,
    subs: Option<Arc<SubscriberSet>>,
    listener: Option<JoinHandle<()>>,
    runtime_token: CancellationToken,
}

impl Runtime<TokioScheduler> {
    /// Returns a builder for a runtime.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }
}

impl<S: Scheduler> Runtime<S> {
    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        reducers: ReducerMap,
        scheduler: S,
        subs: Option<(Handle, Arc<SubscriberSet>)>,
    ) -> Self {
        let runtime_token = CancellationToken::new();
        let reducers = RefCountedReducerManager::new(ReducerManager::new(reducers, bus.clone()));
        let effects = RefCountedManager::new(EffectManager::new(scheduler, bus.clone()), equals);

        let (subs, listener) = match subs {
            Some((rt, set)) => {
                let listener = spawn_listener(&rt, &bus, Arc::clone(&set), runtime_token.clone());
                (Some(set), Some(listener))
            }
            None => (None, None),
        };

        Self {
            cfg,
            bus,
            reducers,
            effects,
            modules: StringRefCounter::new(),
            subs,
            listener,
            runtime_token,
        }
    }

    /// Installs the module's slices and starts its effects.
    ///
    /// Entries already owned by another mounted module are not installed twice.
    /// A module with an empty id is ignored.
    pub fn mount(&mut self, module: &FeatureModule) {
        if module.id().is_empty() {
            return;
        }
        for (name, reducer) in module.reducers() {
            self.reducers.add(name, Arc::clone(reducer));
        }
        self.effects.add(module.effects());
        self.modules.add(module.id());

        self.bus
            .publish(Event::new(EventKind::ModuleMounted).with_subject(module.id()));
    }

    /// Releases the module's slices and effects.
    ///
    /// Entries still owned by another module stay installed. Unmounting a module
    /// that is not mounted is a no-op. A failed effect cancellation is returned
    /// after every slice and effect of the module has been released.
    pub fn unmount(&mut self, module: &FeatureModule) -> Result<(), RuntimeError> {
        if self.modules.count(module.id()) == 0 {
            return Ok(());
        }
        self.modules.remove(module.id());
        for (name, _) in module.reducers() {
            self.reducers.remove(name);
        }
        let res = self.effects.remove(module.effects());

        self.bus
            .publish(Event::new(EventKind::ModuleUnmounted).with_subject(module.id()));
        res.map_err(RuntimeError::from)
    }

    /// True if at least one mount of `id` is outstanding.
    pub fn is_mounted(&self, id: &str) -> bool {
        self.modules.count(id) > 0
    }

    /// Composed transition function handed to the store.
    pub fn reduce(&mut self, state: &State, action: &Action) -> State {
        self.reducers.reduce(state, action)
    }

    /// Snapshot of the installed reducers.
    pub fn reducer_map(&self) -> Arc<ReducerMap> {
        self.reducers.reducer_map()
    }

    /// Descriptors of the running effects.
    pub fn effects(&self) -> Vec<EffectDescriptor> {
        self.effects.items()
    }

    /// Ref-counted reducer manager, for callers registering slices without modules.
    pub fn reducers_mut(&mut self) -> &mut RefCountedReducerManager<ReducerManager> {
        &mut self.reducers
    }

    /// Ref-counted effect manager, for callers starting effects without modules.
    pub fn effects_mut(&mut self) -> &mut RefCountedManager<EffectDescriptor, EffectManager<S>> {
        &mut self.effects
    }

    /// Event bus shared by the managers.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Cancels every running effect and waits up to [`Config::grace`] for them to stop.
    ///
    /// Returns [`RuntimeError::GraceExceeded`] naming the effects still running
    /// when the grace period ends.
    pub async fn shutdown(mut self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));

        let res = match self.effects.inner_mut().cancel_all() {
            Ok(pending) => self.wait_with_grace(pending).await,
            Err(e) => Err(e.into()),
        };

        self.close().await;
        res
    }

    async fn wait_with_grace(&self, pending: Vec<(String, Completion)>) -> Result<(), RuntimeError> {
        let Some(grace) = self.cfg.shutdown_grace() else {
            return Ok(());
        };

        let all = futures::future::join_all(pending.iter().map(|(_, c)| c.wait()));
        match tokio::time::timeout(grace, all).await {
            Ok(_) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                let stuck: Vec<String> = pending
                    .iter()
                    .filter(|(_, c)| !c.is_complete())
                    .map(|(name, _)| name.clone())
                    .collect();
                self.bus
                    .publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(",")));
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Stops the listener and drains subscriber queues.
    async fn close(&mut self) {
        self.runtime_token.cancel();
        if let Some(listener) = self.listener.take() {
            let _ = listener.await;
        }
        if let Some(set) = self.subs.take() {
            if let Ok(set) = Arc::try_unwrap(set) {
                set.shutdown().await;
            }
        }
    }
}

/// Stops the listener; running effects are cancelled when the effect manager drops.
impl<S: Scheduler> Drop for Runtime<S> {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}

/// Forwards bus events to the subscriber set until `token` is cancelled,
/// then delivers whatever is still buffered.
fn spawn_listener(
    rt: &Handle,
    bus: &Bus,
    set: Arc<SubscriberSet>,
    token: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    rt.spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        set.emit(&ev);
                    }
                    break;
                }
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::MockScheduler;
    use crate::effects::{EffectFn, EffectRef};
    use crate::error::EffectError;
    use crate::reducers::{ReducerFn, ReducerRef};
    use crate::subscribers::Subscribe;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn list_reducer(prefix: &'static str) -> ReducerRef {
        ReducerFn::arc(move |state: Option<&Value>, action: &Action| {
            let mut items = state.and_then(Value::as_array).cloned().unwrap_or_default();
            if action.kind.starts_with(prefix) {
                items.push(action.payload.clone().unwrap_or(Value::Null));
            }
            Value::Array(items)
        })
    }

    fn idle(name: &'static str) -> EffectRef {
        EffectFn::arc(name, |ctx: CancellationToken, _arg: Option<Value>| async move {
            ctx.cancelled().await;
            Ok::<_, EffectError>(())
        })
    }

    fn mock_runtime() -> (Runtime<MockScheduler>, MockScheduler) {
        let sched = MockScheduler::default();
        let handle = sched.clone();
        let rt = RuntimeBuilder::new(Config::default())
            .build_with(move |_| handle)
            .unwrap();
        (rt, sched)
    }

    #[test]
    fn shared_cart_slice_follows_last_owner() {
        let (mut rt, sched) = mock_runtime();
        let cart_reducer = list_reducer("cart/");
        let cart_sync = idle("cart-sync");

        let x = FeatureModule::new("x")
            .with_reducer("cart", cart_reducer.clone())
            .with_reducer("x-only", list_reducer("x/"))
            .with_effect(EffectDescriptor::new(cart_sync.clone()));
        let y = FeatureModule::new("y")
            .with_reducer("cart", list_reducer("cart/"))
            .with_effect(EffectDescriptor::new(cart_sync.clone()));

        rt.mount(&x);
        rt.mount(&y);
        assert_eq!(sched.started(), 1);
        assert!(Arc::ptr_eq(&rt.reducer_map()["cart"], &cart_reducer));

        let state = rt.reduce(&State::new().with("host", json!("kept")), &Action::new("@@init"));
        let state = rt.reduce(&state, &Action::new("cart/add").with_payload(json!("pear")));
        assert_eq!(state.get("cart"), Some(&json!(["pear"])));

        rt.unmount(&x).unwrap();
        assert!(!rt.is_mounted("x"));
        assert!(rt.reducer_map().contains_key("cart"));
        assert!(!rt.reducer_map().contains_key("x-only"));
        assert!(sched.cancelled().is_empty());
        assert_eq!(rt.effects().len(), 1);

        let state = rt.reduce(&state, &Action::new("noop"));
        assert_eq!(state.get("cart"), Some(&json!(["pear"])));
        assert!(!state.contains("x-only"));

        rt.unmount(&y).unwrap();
        assert!(!rt.reducer_map().contains_key("cart"));
        assert_eq!(sched.cancelled(), vec!["cart-sync".to_string()]);

        let state = rt.reduce(&state, &Action::new("noop"));
        assert!(!state.contains("cart"));
    }

    #[test]
    fn unmounting_an_unmounted_module_releases_nothing() {
        let (mut rt, sched) = mock_runtime();
        let shared = idle("shared");
        let owner = FeatureModule::new("owner").with_effect(EffectDescriptor::new(shared.clone()));
        let stranger = FeatureModule::new("stranger").with_effect(EffectDescriptor::new(shared));

        rt.mount(&owner);
        rt.unmount(&stranger).unwrap();
        rt.unmount(&stranger).unwrap();

        assert!(sched.cancelled().is_empty());
        assert_eq!(rt.effects().len(), 1);
    }

    #[test]
    fn initial_reducers_outlive_modules() {
        let sched = MockScheduler::default();
        let mut initial = ReducerMap::new();
        initial.insert("session".to_string(), list_reducer("session/"));
        let mut rt = RuntimeBuilder::new(Config::default())
            .with_reducers(initial)
            .build_with(move |_| sched)
            .unwrap();

        let m = FeatureModule::new("m").with_reducer("session", list_reducer("other/"));
        rt.mount(&m);
        rt.unmount(&m).unwrap();

        assert!(rt.reducer_map().contains_key("session"));
        assert_eq!(rt.reducers_mut().count("session"), 1);
    }

    #[test]
    fn cancel_failure_surfaces_from_unmount() {
        let sched = MockScheduler {
            reject_cancel: true,
            ..MockScheduler::default()
        };
        let mut rt = RuntimeBuilder::new(Config::default())
            .build_with(move |_| sched)
            .unwrap();
        let m = FeatureModule::new("m")
            .with_reducer("slice", list_reducer("s/"))
            .with_effect(EffectDescriptor::new(idle("leaky")));

        rt.mount(&m);
        let err = rt.unmount(&m).unwrap_err();

        assert_eq!(err.as_label(), "effect_cancel_rejected");
        assert!(!rt.reducer_map().contains_key("slice"));
    }

    #[test]
    fn subscribers_need_a_tokio_runtime() {
        struct Quiet;

        #[async_trait]
        impl Subscribe for Quiet {
            async fn on_event(&self, _event: &Event) {}
        }

        let res = RuntimeBuilder::new(Config::default())
            .with_subscribers(vec![Arc::new(Quiet)])
            .build_with(|_| MockScheduler::default());
        assert!(matches!(res, Err(RuntimeError::NoReactor)));
    }

    #[tokio::test]
    async fn shutdown_waits_for_cooperative_effects() {
        let mut rt = Runtime::builder(Config::default()).build().unwrap();
        let mut rx = rt.bus().subscribe();
        rt.mount(
            &FeatureModule::new("m")
                .with_effect(EffectDescriptor::with_argument(idle("poll"), json!(1)))
                .with_effect(EffectDescriptor::with_argument(idle("poll"), json!(2))),
        );
        assert_eq!(rt.effects().len(), 2);

        rt.shutdown().await.unwrap();

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert!(kinds.contains(&EventKind::AllStoppedWithin));
    }

    #[tokio::test]
    async fn shutdown_reports_effects_ignoring_cancellation() {
        let cfg = Config {
            grace: Duration::from_millis(50),
            ..Config::default()
        };
        let mut rt = Runtime::builder(cfg).build().unwrap();
        let stubborn: EffectRef = EffectFn::arc("stubborn", |_ctx: CancellationToken, _arg: Option<Value>| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, EffectError>(())
        });
        rt.mount(
            &FeatureModule::new("m")
                .with_effect(EffectDescriptor::new(stubborn))
                .with_effect(EffectDescriptor::new(idle("polite"))),
        );

        match rt.shutdown().await {
            Err(RuntimeError::GraceExceeded { stuck, .. }) => {
                assert_eq!(stuck, vec!["stubborn".to_string()]);
            }
            other => panic!("expected grace exceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn subscribers_observe_module_events() {
        #[derive(Default)]
        struct Collect {
            seen: Mutex<Vec<(EventKind, Option<String>)>>,
        }

        #[async_trait]
        impl Subscribe for Collect {
            async fn on_event(&self, event: &Event) {
                let subject = event.subject.as_deref().map(str::to_owned);
                self.seen.lock().unwrap().push((event.kind, subject));
            }

            fn name(&self) -> &'static str {
                "collect"
            }
        }

        let collect = Arc::new(Collect::default());
        let mut rt = Runtime::builder(Config::default())
            .with_subscribers(vec![collect.clone()])
            .build()
            .unwrap();

        let m = FeatureModule::new("cart").with_reducer("cart", list_reducer("cart/"));
        rt.mount(&m);
        rt.unmount(&m).unwrap();
        rt.shutdown().await.unwrap();

        let seen = collect.seen.lock().unwrap().clone();
        let cart = Some("cart".to_string());
        assert_eq!(
            seen,
            vec![
                (EventKind::SliceAdded, cart.clone()),
                (EventKind::ModuleMounted, cart.clone()),
                (EventKind::SliceRemoved, cart.clone()),
                (EventKind::ModuleUnmounted, cart),
                (EventKind::ShutdownRequested, None),
                (EventKind::AllStoppedWithin, None),
            ]
        );
    }

    #[test]
    fn failed_cancel_still_releases_every_effect_of_the_module() {
        let sched = MockScheduler {
            reject_named: Some("a"),
            ..MockScheduler::default()
        };
        let journal = sched.clone();
        let mut rt = RuntimeBuilder::new(Config::default())
            .build_with(move |_| sched)
            .unwrap();
        let a = EffectDescriptor::new(idle("a"));
        let b = EffectDescriptor::new(idle("b"));
        let m = FeatureModule::new("m").with_effect(a.clone()).with_effect(b.clone());

        rt.mount(&m);
        assert!(rt.unmount(&m).is_err());

        assert!(!rt.is_mounted("m"));
        assert!(rt.effects().is_empty());
        assert_eq!(rt.effects_mut().count(&a), 0);
        assert_eq!(rt.effects_mut().count(&b), 0);
        assert_eq!(journal.cancelled(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn dropping_the_runtime_cancels_running_effects() {
        let (stopped_tx, stopped_rx) = oneshot::channel::<()>();
        let stopped_tx = Mutex::new(Some(stopped_tx));
        let watcher: EffectRef = EffectFn::arc("watcher", move |ctx: CancellationToken, _arg: Option<Value>| {
            let tx = stopped_tx.lock().unwrap().take();
            async move {
                ctx.cancelled().await;
                if let Some(tx) = tx {
                    let _ = tx.send(());
                }
                Ok::<_, EffectError>(())
            }
        });

        let mut rt = Runtime::builder(Config::default()).build().unwrap();
        rt.mount(&FeatureModule::new("m").with_effect(EffectDescriptor::new(watcher)));
        drop(rt);

        tokio::time::timeout(Duration::from_secs(1), stopped_rx)
            .await
            .expect("routine observes cancellation after drop")
            .unwrap();
    }
}
