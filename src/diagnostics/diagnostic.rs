//! # Diagnostics emitted by the registry.
//!
//! The [`DiagnosticKind`] enum classifies what happened inside a registry:
//! - **Bookkeeping**: subscriptions added/removed, event names retired, full resets
//! - **Dispatch**: callbacks invoked, failed or panicked
//! - **Workers**: per-event workers started/stopped, deliveries dropped
//!
//! The [`Diagnostic`] struct carries metadata such as a timestamp, the event name,
//! the subscription id and a reason.
//!
//! ## Ordering guarantees
//! Each diagnostic has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use observable::{Diagnostic, DiagnosticKind};
//!
//! let d = Diagnostic::new(DiagnosticKind::CallbackFailed)
//!     .with_event("foo")
//!     .with_reason("boom");
//!
//! assert_eq!(d.kind, DiagnosticKind::CallbackFailed);
//! assert_eq!(d.event.as_deref(), Some("foo"));
//! assert!(d.is_failure());
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::core::SubscriptionId;
use crate::error::CallbackFailure;

/// Global sequence counter for diagnostic ordering.
static DIAGNOSTIC_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of registry diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    // === Bookkeeping ===
    /// A subscription was registered under an event name.
    ///
    /// Sets: `event`, `subscription`.
    Subscribed,

    /// Subscriptions were removed from an event name.
    ///
    /// Sets: `event`, `count` (number removed), `subscription` (when removed by id).
    Unsubscribed,

    /// An event name lost its last subscription and was deleted from the map.
    ///
    /// Sets: `event`.
    EventRetired,

    /// Every subscription was dropped (`off("*")`).
    ///
    /// Sets: `count` (number of retired event names).
    Cleared,

    // === Dispatch ===
    /// A publish was dispatched to the subscriptions of one event name.
    ///
    /// Sets: `event` (list dispatched), `source` (published name), `count` (invocations).
    Dispatched,

    /// A callback returned an error.
    ///
    /// Sets: `event`, `subscription`, `reason`.
    CallbackFailed,

    /// A callback panicked; the panic was caught.
    ///
    /// Sets: `event`, `subscription`, `reason` (panic message).
    CallbackPanicked,

    // === Workers ===
    /// A per-event worker was spawned.
    ///
    /// Sets: `event`.
    WorkerStarted,

    /// A per-event worker exited.
    ///
    /// Sets: `event`.
    WorkerStopped,

    /// A per-event worker task panicked outside callback isolation.
    ///
    /// Sets: `event`, `reason`.
    WorkerPanicked,

    /// A publish could not be queued because the worker had already retired.
    ///
    /// Sets: `event`, `reason`.
    DeliveryDropped,
}

/// Registry diagnostic with optional metadata.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Diagnostic classification.
    pub kind: DiagnosticKind,
    /// Event name the diagnostic relates to.
    pub event: Option<Arc<str>>,
    /// Name that was published, when it differs from `event` (wildcard dispatch).
    pub source: Option<Arc<str>>,
    /// Subscription involved, if any.
    pub subscription: Option<SubscriptionId>,
    /// Human-readable reason (errors, panic messages, etc.).
    pub reason: Option<Arc<str>>,
    /// Count attached to the diagnostic (removed subscriptions, invocations...).
    pub count: Option<usize>,
}

impl Diagnostic {
    /// Creates a diagnostic of the given kind with current timestamp and next sequence number.
    pub fn new(kind: DiagnosticKind) -> Self {
        Self {
            seq: DIAGNOSTIC_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            event: None,
            source: None,
            subscription: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches an event name.
    #[inline]
    pub fn with_event(mut self, event: impl Into<Arc<str>>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Attaches the published name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a subscription id.
    #[inline]
    pub fn with_subscription(mut self, id: SubscriptionId) -> Self {
        self.subscription = Some(id);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Builds the diagnostic describing a failed invocation.
    pub fn callback_failure(failure: &CallbackFailure) -> Self {
        let kind = if failure.error.is_panic() {
            DiagnosticKind::CallbackPanicked
        } else {
            DiagnosticKind::CallbackFailed
        };
        Diagnostic::new(kind)
            .with_event(Arc::clone(&failure.event))
            .with_subscription(failure.subscription)
            .with_reason(failure.error.to_string())
    }

    /// `true` for callback failures and panics.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::CallbackFailed
                | DiagnosticKind::CallbackPanicked
                | DiagnosticKind::WorkerPanicked
        )
    }
}
