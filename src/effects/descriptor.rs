//! # Effect descriptors and their equality.
//!
//! An [`EffectDescriptor`] identifies one running effect: a routine plus an
//! optional bound argument. Two descriptors are equal when they point to the
//! **same routine allocation** and carry **structurally equal** arguments, so
//! the same routine bound to `1` and to `2` runs as two distinct effects, and
//! two separately built but equal arguments address the same effect.
//!
//! A bare routine is the descriptor with no argument.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::effect::EffectRef;

/// Routine plus optional bound argument.
#[derive(Clone)]
pub struct EffectDescriptor {
    effect: EffectRef,
    argument: Option<Value>,
}

impl EffectDescriptor {
    /// Descriptor for a routine without argument.
    pub fn new(effect: EffectRef) -> Self {
        Self {
            effect,
            argument: None,
        }
    }

    /// Descriptor for a routine started with `argument`.
    pub fn with_argument(effect: EffectRef, argument: Value) -> Self {
        Self {
            effect,
            argument: Some(argument),
        }
    }

    /// The routine.
    pub fn effect(&self) -> &EffectRef {
        &self.effect
    }

    /// The bound argument, if any.
    pub fn argument(&self) -> Option<&Value> {
        self.argument.as_ref()
    }

    /// Convenience: the routine name.
    pub fn name(&self) -> &str {
        self.effect.name()
    }
}

/// Descriptor equality: routine identity and deep argument equality.
pub fn equals(a: &EffectDescriptor, b: &EffectDescriptor) -> bool {
    Arc::ptr_eq(&a.effect, &b.effect) && a.argument == b.argument
}

impl PartialEq for EffectDescriptor {
    fn eq(&self, other: &Self) -> bool {
        equals(self, other)
    }
}

impl From<EffectRef> for EffectDescriptor {
    fn from(effect: EffectRef) -> Self {
        Self::new(effect)
    }
}

impl fmt::Debug for EffectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectDescriptor")
            .field("effect", &self.effect.name())
            .field("argument", &self.argument)
            .finish()
    }
}
