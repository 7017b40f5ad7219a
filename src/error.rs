//! Error types used by the modvisor runtime and its effects.
//!
//! This module defines two error enums:
//!
//! - [`EffectError`]: errors raised by effect routines and by the scheduler when a
//!   cancellation request cannot be delivered.
//! - [`RuntimeError`]: errors raised by the [`Runtime`](crate::Runtime) itself.
//!
//! Everything else in the core (double registration, redundant removal, empty names)
//! is a silent no-op and never surfaces as an error.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by effect routines and their handles.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EffectError {
    /// Routine failed while running.
    #[error("effect failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Routine observed its cancellation token and exited early.
    #[error("effect cancelled")]
    Canceled,

    /// The scheduler refused or failed to deliver a cancellation request.
    ///
    /// Returned from `remove` paths; the handle has already been forgotten,
    /// so the routine may keep running.
    #[error("cancel rejected for effect '{effect}': {reason}")]
    CancelRejected {
        /// Name of the effect whose handle could not be cancelled.
        effect: String,
        /// Scheduler-provided reason.
        reason: String,
    },
}

impl EffectError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use modvisor::EffectError;
    ///
    /// let err = EffectError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "effect_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EffectError::Fail { .. } => "effect_failed",
            EffectError::Canceled => "effect_canceled",
            EffectError::CancelRejected { .. } => "effect_cancel_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EffectError::Fail { error } => format!("error: {error}"),
            EffectError::Canceled => "cancelled".to_string(),
            EffectError::CancelRejected { effect, reason } => {
                format!("cancel rejected: effect={effect} reason={reason}")
            }
        }
    }
}

/// # Errors produced by the modvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A component that spawns work was built outside of a tokio runtime.
    #[error("no tokio runtime available to spawn effects or subscribers")]
    NoReactor,

    /// Shutdown grace period was exceeded; some effects ignored cancellation.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of effects that did not finish in time.
        stuck: Vec<String>,
    },

    /// An effect handle failed while being removed.
    #[error(transparent)]
    Effect(#[from] EffectError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use modvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoReactor => "runtime_no_reactor",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Effect(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::NoReactor => "no tokio runtime".to_string(),
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck effects={stuck:?}")
            }
            RuntimeError::Effect(e) => e.as_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_errors_convert_into_runtime_errors() {
        let err: RuntimeError = EffectError::CancelRejected {
            effect: "poller".into(),
            reason: "closed".into(),
        }
        .into();

        assert_eq!(err.as_label(), "effect_cancel_rejected");
        assert_eq!(
            err.to_string(),
            "cancel rejected for effect 'poller': closed"
        );
    }
}
