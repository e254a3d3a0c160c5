//! Error types used by the registry and by callbacks.
//!
//! This module defines two main error enums:
//!
//! - [`RegistryError`]: misuse of the registry API or failures collected during a dispatch.
//! - [`CallbackError`]: failures raised by an individual callback invocation.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::sync::Arc;

use thiserror::Error;

use crate::core::SubscriptionId;

/// # Errors produced by the registry.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistryError {
    /// `try_off` was given more than one callback. Nothing was removed.
    #[error("off accepts at most one callback, {given} were given")]
    TooManyCallbacks {
        /// Number of callbacks passed in.
        given: usize,
    },

    /// One or more callbacks failed during a synchronous dispatch.
    ///
    /// The remaining callbacks of the dispatch still ran.
    #[error("{} callback(s) failed during dispatch", failures.len())]
    DispatchFailed {
        /// Every failure, in invocation order.
        failures: Vec<CallbackFailure>,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use observable::RegistryError;
    ///
    /// let err = RegistryError::TooManyCallbacks { given: 2 };
    /// assert_eq!(err.as_label(), "registry_too_many_callbacks");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::TooManyCallbacks { .. } => "registry_too_many_callbacks",
            RegistryError::DispatchFailed { .. } => "registry_dispatch_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RegistryError::TooManyCallbacks { given } => {
                format!("too many callbacks: {given}")
            }
            RegistryError::DispatchFailed { failures } => {
                let parts: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
                format!("dispatch failed: [{}]", parts.join(", "))
            }
        }
    }

    /// Returns the collected callback failures, if this is a dispatch error.
    pub fn failures(&self) -> &[CallbackFailure] {
        match self {
            RegistryError::DispatchFailed { failures } => failures,
            _ => &[],
        }
    }
}

/// # Errors produced by a callback invocation.
///
/// Argument accessors on [`Args`](crate::Args) return the first two variants,
/// so a callback can simply use `?` to report a shape mismatch.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// Fewer arguments were published than the callback expected.
    #[error("missing argument #{index} (expected {expected})")]
    MissingArgument {
        /// Zero-based argument position.
        index: usize,
        /// Type the callback asked for.
        expected: &'static str,
    },

    /// The argument at `index` has a different type than the callback expected.
    #[error("argument #{index} is {found}, expected {expected}")]
    ArgumentMismatch {
        /// Zero-based argument position.
        index: usize,
        /// Type the callback asked for.
        expected: &'static str,
        /// Type that was actually published.
        found: &'static str,
    },

    /// The callback reported a failure of its own.
    #[error("callback failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The callback panicked; the panic was caught by the dispatcher.
    #[error("callback panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl CallbackError {
    /// Shorthand for [`CallbackError::Failed`].
    pub fn fail(error: impl Into<String>) -> Self {
        CallbackError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use observable::CallbackError;
    ///
    /// let err = CallbackError::fail("boom");
    /// assert_eq!(err.as_label(), "callback_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CallbackError::MissingArgument { .. } => "callback_missing_argument",
            CallbackError::ArgumentMismatch { .. } => "callback_argument_mismatch",
            CallbackError::Failed { .. } => "callback_failed",
            CallbackError::Panicked { .. } => "callback_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallbackError::MissingArgument { index, expected } => {
                format!("missing: #{index} {expected}")
            }
            CallbackError::ArgumentMismatch {
                index,
                expected,
                found,
            } => format!("mismatch: #{index} {found} != {expected}"),
            CallbackError::Failed { error } => format!("error: {error}"),
            CallbackError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Returns `true` when the failure came from a panic rather than an `Err` return.
    pub fn is_panic(&self) -> bool {
        matches!(self, CallbackError::Panicked { .. })
    }
}

/// A single failed invocation collected during dispatch.
#[derive(Error, Debug, Clone)]
#[error("event={event} subscription={subscription}: {error}")]
pub struct CallbackFailure {
    /// Event name the failing subscription is registered under.
    pub event: Arc<str>,
    /// Subscription that failed.
    pub subscription: SubscriptionId,
    /// What went wrong.
    #[source]
    pub error: CallbackError,
}
