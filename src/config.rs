//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the [`Runtime`](crate::Runtime).
//!
//! ## Sentinel values
//! - `grace = 0s` → shutdown requests cancellation and returns without waiting
//! - `bus_capacity = 0` → clamped to 1 by the bus

use std::time::Duration;

/// Global configuration for the runtime.
///
/// ## Field semantics
/// - `grace`: Maximum wait for effects to stop during shutdown (`0s` = no wait)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for cancelled effects during [`Runtime::shutdown`](crate::Runtime::shutdown).
    ///
    /// Effects still running after `grace` are reported in
    /// `RuntimeError::GraceExceeded`.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the shutdown grace period as an `Option`.
    ///
    /// - `None` → do not wait for cancelled effects
    /// - `Some(d)` → wait up to `d`
    #[inline]
    pub fn shutdown_grace(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}
