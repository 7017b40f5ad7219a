//! # modvisor
//!
//! **Modvisor** keeps a single composed reducer and a set of running
//! background effects consistent while feature modules are mounted and
//! unmounted at run time.
//!
//! Several modules may register the same slice name or the same effect. The
//! ref-counted managers install an entry on its first request and uninstall it
//! only when its last owner releases it, so shared state and shared background
//! work survive any one module going away.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │FeatureModule │   │FeatureModule │   │FeatureModule │
//!     │   (cart)     │   │  (checkout)  │   │  (profile)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ mount/unmount    ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Runtime (capability object)                                      │
//! │  - RefCountedReducerManager ─► ReducerManager ─► CombinedReducer  │
//! │  - RefCountedManager ────────► EffectManager ──► Scheduler        │
//! │  - Bus (broadcast events)                                         │
//! └──────┬───────────────────────────────────────┬────────────────────┘
//!        │ reduce(state, action)                 │ publish
//!        ▼                                       ▼
//!   ┌──────────┐              ┌─────────────────────────────────────┐
//!   │  store   │              │        Bus (broadcast channel)      │
//!   └──────────┘              │  (capacity: Config::bus_capacity)   │
//!                             └──────────────────┬──────────────────┘
//!                                                ▼
//!                                          SubscriberSet
//!                                          (per-sub queues)
//!                                      ┌─────────┼─────────┐
//!                                      ▼         ▼         ▼
//!                                   worker1   worker2   workerN
//! ```
//!
//! ### Slice lifecycle
//! ```text
//! add(name)    ─► count 0→1 ─► install reducer ─► publish SliceAdded
//! add(name)    ─► count 1→2 ─► (nothing forwarded)
//! remove(name) ─► count 2→1 ─► (nothing forwarded)
//! remove(name) ─► count 1→0 ─► uninstall reducer, mark pending ─► publish SliceRemoved
//! reduce(s, a) ─► excise pending slices from s ─► run CombinedReducer
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                                  |
//! |-------------------|------------------------------------------------------------------|-----------------------------------------------------|
//! | **Reducers**      | Compose named slice reducers; excise removed slices lazily.      | [`Reducer`], [`ReducerManager`], [`CombinedReducer`]|
//! | **Effects**       | Start and cancel background routines by descriptor.             | [`Effect`], [`EffectDescriptor`], [`EffectManager`] |
//! | **Ref counting**  | Share entries between modules; forward first add and last remove.| [`RefCountedReducerManager`], [`RefCountedManager`] |
//! | **Modules**       | Bundle slices and effects; mount and unmount as a unit.          | [`FeatureModule`], [`Runtime`]                      |
//! | **Subscriber API**| Observe slice, effect and module events.                         | [`Subscribe`], [`Event`]                            |
//! | **Errors**        | Typed errors for effects and the runtime.                        | [`EffectError`], [`RuntimeError`]                   |
//! | **Configuration** | Shutdown grace and bus capacity.                                 | [`Config`]                                          |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber backed by `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::{json, Value};
//! use tokio_util::sync::CancellationToken;
//! use modvisor::{Action, Config, EffectDescriptor, EffectError, EffectFn, EffectRef, FeatureModule, ReducerFn, Runtime, State};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn modvisor::Subscribe>> = vec![Arc::new(modvisor::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn modvisor::Subscribe>> = Vec::new();
//!
//!     let mut rt = Runtime::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     let cart = ReducerFn::arc(|state, action| {
//!         let mut items = state.and_then(Value::as_array).cloned().unwrap_or_default();
//!         if action.is("cart/add") {
//!             items.extend(action.payload.clone());
//!         }
//!         Value::Array(items)
//!     });
//!     let sync: EffectRef = EffectFn::arc("cart-sync", |ctx: CancellationToken, _arg: Option<Value>| async move {
//!         ctx.cancelled().await;
//!         Err(EffectError::Canceled)
//!     });
//!
//!     let shop = FeatureModule::new("shop")
//!         .with_reducer("cart", cart.clone())
//!         .with_effect(EffectDescriptor::new(sync.clone()));
//!     let checkout = FeatureModule::new("checkout")
//!         .with_reducer("cart", cart)
//!         .with_effect(EffectDescriptor::new(sync));
//!
//!     rt.mount(&shop);
//!     rt.mount(&checkout);
//!     assert_eq!(rt.effects().len(), 1);
//!
//!     let state = rt.reduce(&State::new(), &Action::new("cart/add").with_payload(json!("pear")));
//!     rt.unmount(&shop)?;
//!     let state = rt.reduce(&state, &Action::new("noop"));
//!     assert_eq!(state.get("cart"), Some(&json!(["pear"])));
//!
//!     rt.unmount(&checkout)?;
//!     assert!(rt.reduce(&state, &Action::new("noop")).is_empty());
//!
//!     rt.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod effects;
mod error;
mod events;
mod managers;
mod reducers;
mod subscribers;
mod util;

// ---- Public re-exports ----

pub use crate::core::{FeatureModule, Runtime, RuntimeBuilder};
pub use config::Config;
pub use effects::{
    equals, Completion, Effect, EffectDescriptor, EffectFn, EffectHandle, EffectManager,
    EffectRef, EffectTask, Scheduler, TokioScheduler,
};
pub use error::{EffectError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use managers::{ItemManager, RefCountedManager};
pub use reducers::{
    Action, CombinedReducer, Reducer, ReducerFn, ReducerManager, ReducerMap, ReducerRef,
    RefCountedReducerManager, SliceManager, State,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use util::{ComparableMap, Equality, ObjectRefCounter, RefCount, StringRefCounter};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
