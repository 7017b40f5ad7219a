//! # Example: feature_modules
//!
//! Mount and unmount two feature modules that share a slice and an effect.
//!
//! Demonstrates how to:
//! - Build a `Runtime` with the built-in `LogWriter` subscriber.
//! - Register the same `cart` slice and `cart-sync` effect from two modules.
//! - Observe that the shared entries are installed once and released once.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► mount(shop)      ─► SliceAdded(cart), SliceAdded(catalog), EffectStarted(cart-sync)
//!   ├─► mount(checkout)  ─► SliceAdded(payment) only
//!   ├─► reduce(...)      ─► cart/add, payment/select
//!   ├─► unmount(shop)    ─► SliceRemoved(catalog); cart and cart-sync stay
//!   ├─► unmount(checkout)─► SliceRemoved(cart, payment), EffectCancelled(cart-sync)
//!   ├─► reduce(...)      ─► removed slices excised from the state
//!   └─► shutdown()
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example feature_modules
//! ```

use std::{sync::Arc, time::Duration};

use modvisor::{
    Action, Config, EffectDescriptor, EffectError, EffectFn, EffectRef, FeatureModule, LogWriter,
    ReducerFn, ReducerRef, Runtime, State, Subscribe,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// List slice appending the payload of every `<prefix>/add` action.
fn list(prefix: &'static str) -> ReducerRef {
    ReducerFn::arc(move |state: Option<&Value>, action: &Action| {
        let mut items = state.and_then(Value::as_array).cloned().unwrap_or_default();
        if action.kind == format!("{prefix}/add") {
            items.extend(action.payload.clone());
        }
        Value::Array(items)
    })
}

/// Slice holding the payload of the last `payment/select` action.
fn payment() -> ReducerRef {
    ReducerFn::arc(|state: Option<&Value>, action: &Action| match action.kind.as_str() {
        "payment/select" => action.payload.clone().unwrap_or(Value::Null),
        _ => state.cloned().unwrap_or(Value::Null),
    })
}

/// Background sync loop; exits when its token is cancelled.
fn cart_sync() -> EffectRef {
    EffectFn::arc("cart-sync", |ctx: CancellationToken, arg: Option<Value>| async move {
        let period = arg
            .as_ref()
            .and_then(|v| v.get("period_ms"))
            .and_then(Value::as_u64)
            .unwrap_or(100);
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Err::<(), _>(EffectError::Canceled),
                _ = tokio::time::sleep(Duration::from_millis(period)) => {
                    println!("[cart-sync] pushing cart");
                }
            }
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1) Runtime with the tracing-backed log subscriber
    let mut cfg = Config::default();
    cfg.grace = Duration::from_secs(2);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
    let mut rt = Runtime::builder(cfg).with_subscribers(subs).build()?;

    // 2) Two modules sharing the cart slice and the sync effect
    let cart = list("cart");
    let sync = EffectDescriptor::with_argument(cart_sync(), json!({ "period_ms": 50 }));

    let shop = FeatureModule::new("shop")
        .with_reducer("cart", cart.clone())
        .with_reducer("catalog", list("catalog"))
        .with_effect(sync.clone());
    let checkout = FeatureModule::new("checkout")
        .with_reducer("cart", cart)
        .with_reducer("payment", payment())
        .with_effect(sync);

    rt.mount(&shop);
    rt.mount(&checkout);
    println!("slices: {:?}", rt.reducer_map().keys().collect::<Vec<_>>());
    println!("effects: {:?}", rt.effects());

    // 3) Drive a few actions
    let mut state = State::new();
    for action in [
        Action::new("@@init"),
        Action::new("cart/add").with_payload(json!("pear")),
        Action::new("catalog/add").with_payload(json!("fruit")),
        Action::new("payment/select").with_payload(json!("card")),
    ] {
        state = rt.reduce(&state, &action);
    }
    println!("state: {}", state.to_value());
    tokio::time::sleep(Duration::from_millis(120)).await;

    // 4) Shop goes away; cart and cart-sync stay owned by checkout
    rt.unmount(&shop)?;
    state = rt.reduce(&state, &Action::new("noop"));
    println!("after unmount(shop): {}", state.to_value());

    // 5) Last owner gone; everything is released
    rt.unmount(&checkout)?;
    state = rt.reduce(&state, &Action::new("noop"));
    println!("after unmount(checkout): {}", state.to_value());

    rt.shutdown().await?;
    Ok(())
}
