//! # LogWriter: diagnostics to `tracing`
//!
//! A minimal observer that forwards every [`Diagnostic`] to the `tracing` facade.
//! Bookkeeping goes out at `debug`, failures at `warn`.
//!
//! ## Example output (with a fmt subscriber)
//! ```text
//! DEBUG observable: subscribed event="foo" subscription=#1
//! DEBUG observable: dispatched event="*" source="foo" invoked=2
//!  WARN observable: callback failed event="foo" subscription=#3 err="callback failed: boom"
//! DEBUG observable: event retired event="foo"
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::observers::Observe;

/// Diagnostic writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Observe for LogWriter {
    fn on_diagnostic(&self, d: &Diagnostic) {
        let event = d.event.as_deref().unwrap_or("-");
        let sub = d
            .subscription
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let reason = d.reason.as_deref().unwrap_or("");

        match d.kind {
            DiagnosticKind::Subscribed => {
                tracing::debug!(target: "observable", event, subscription = %sub, "subscribed");
            }
            DiagnosticKind::Unsubscribed => {
                tracing::debug!(
                    target: "observable",
                    event,
                    subscription = %sub,
                    removed = d.count.unwrap_or(0),
                    "unsubscribed"
                );
            }
            DiagnosticKind::EventRetired => {
                tracing::debug!(target: "observable", event, "event retired");
            }
            DiagnosticKind::Cleared => {
                tracing::debug!(target: "observable", retired = d.count.unwrap_or(0), "cleared");
            }
            DiagnosticKind::Dispatched => {
                tracing::debug!(
                    target: "observable",
                    event,
                    source = d.source.as_deref().unwrap_or(event),
                    invoked = d.count.unwrap_or(0),
                    "dispatched"
                );
            }
            DiagnosticKind::CallbackFailed => {
                tracing::warn!(target: "observable", event, subscription = %sub, err = reason, "callback failed");
            }
            DiagnosticKind::CallbackPanicked => {
                tracing::warn!(target: "observable", event, subscription = %sub, info = reason, "callback panicked");
            }
            DiagnosticKind::WorkerStarted => {
                tracing::debug!(target: "observable", event, "worker started");
            }
            DiagnosticKind::WorkerStopped => {
                tracing::debug!(target: "observable", event, "worker stopped");
            }
            DiagnosticKind::WorkerPanicked => {
                tracing::warn!(target: "observable", event, info = reason, "worker panicked");
            }
            DiagnosticKind::DeliveryDropped => {
                tracing::debug!(target: "observable", event, reason, "delivery dropped");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_every_kind_without_subscriber() {
        let w = LogWriter::new();
        for kind in [
            DiagnosticKind::Subscribed,
            DiagnosticKind::Unsubscribed,
            DiagnosticKind::EventRetired,
            DiagnosticKind::Cleared,
            DiagnosticKind::Dispatched,
            DiagnosticKind::CallbackFailed,
            DiagnosticKind::CallbackPanicked,
            DiagnosticKind::WorkerStarted,
            DiagnosticKind::WorkerStopped,
            DiagnosticKind::WorkerPanicked,
            DiagnosticKind::DeliveryDropped,
        ] {
            w.on_diagnostic(&Diagnostic::new(kind).with_event("foo").with_reason("r"));
        }
        assert_eq!(w.name(), "LogWriter");
    }
}
