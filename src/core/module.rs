//! # Feature modules.
//!
//! A [`FeatureModule`] lists the slices and effects one independently
//! loadable feature needs while it is mounted. It carries no ownership
//! itself; mounting hands each entry to the runtime's ref-counted managers,
//! so features sharing a slice name or an equal effect descriptor share the
//! installed instance.
//!
//! ## Example
//! ```rust
//! use modvisor::{EffectDescriptor, EffectError, EffectFn, FeatureModule, ReducerFn};
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//!
//! let sync = EffectFn::arc("cart-sync", |ctx: CancellationToken, _arg| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, EffectError>(())
//! });
//!
//! let cart = FeatureModule::new("cart")
//!     .with_reducer("cart", ReducerFn::arc(|state, _action| state.cloned().unwrap_or(json!([]))))
//!     .with_effect(EffectDescriptor::new(sync));
//!
//! assert_eq!(cart.id(), "cart");
//! assert_eq!(cart.reducers().len(), 1);
//! ```

use std::fmt;

use crate::effects::EffectDescriptor;
use crate::reducers::ReducerRef;

/// Slices and effects required by one feature.
#[derive(Clone, Default)]
pub struct FeatureModule {
    id: String,
    reducers: Vec<(String, ReducerRef)>,
    effects: Vec<EffectDescriptor>,
}

impl FeatureModule {
    /// Creates an empty module.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Adds a slice reducer.
    pub fn with_reducer(mut self, name: impl Into<String>, reducer: ReducerRef) -> Self {
        self.reducers.push((name.into(), reducer));
        self
    }

    /// Adds an effect.
    pub fn with_effect(mut self, effect: EffectDescriptor) -> Self {
        self.effects.push(effect);
        self
    }

    /// Module id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Slice reducers, in insertion order.
    pub fn reducers(&self) -> &[(String, ReducerRef)] {
        &self.reducers
    }

    /// Effects, in insertion order.
    pub fn effects(&self) -> &[EffectDescriptor] {
        &self.effects
    }
}

impl fmt::Debug for FeatureModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slices: Vec<&str> = self.reducers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("FeatureModule")
            .field("id", &self.id)
            .field("slices", &slices)
            .field("effects", &self.effects)
            .finish()
    }
}
