//! Runtime core: feature modules and the runtime that mounts them.
//!
//! The public API from this module is [`Runtime`] (built with
//! [`RuntimeBuilder`]) and [`FeatureModule`].
//!
//! Internal modules:
//! - [`module`]: the reducers and effects one feature needs;
//! - [`runtime`]: ref-counted managers, event fan-out, graceful shutdown;
//! - [`builder`]: wiring of bus, scheduler and subscribers.

mod builder;
mod module;
mod runtime;

pub use builder::RuntimeBuilder;
pub use module::FeatureModule;
pub use runtime::Runtime;
