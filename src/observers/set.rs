//! # Fan-out of diagnostics to multiple observers.
//!
//! ```text
//! emit(diagnostic)
//!     │
//!     ├──► observer1.on_diagnostic()
//!     │        └── panic caught, next observer still runs
//!     ├──► observer2.on_diagnostic()
//!     └──► observerN.on_diagnostic()
//! ```
//!
//! ## Rules
//! - Observers are called in registration order.
//! - Observer panics are isolated and not re-reported (a report would loop back here).
//! - With no observers, diagnostics are never built (`emit_with` skips the closure).

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::diagnostics::Diagnostic;
use crate::observers::Observe;

/// Ordered set of observers.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn Observe>>,
}

impl ObserverSet {
    /// Creates a set from the given observers.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observe>>) -> Self {
        Self { observers }
    }

    /// Returns `true` if no observer is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Number of observers.
    #[inline]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Names of the observers, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// Delivers a diagnostic to every observer.
    pub fn emit(&self, diagnostic: &Diagnostic) {
        for observer in &self.observers {
            let _ = catch_unwind(AssertUnwindSafe(|| observer.on_diagnostic(diagnostic)));
        }
    }

    /// Builds the diagnostic only if someone is listening, then delivers it.
    #[inline]
    pub fn emit_with<F>(&self, build: F)
    where
        F: FnOnce() -> Diagnostic,
    {
        if self.observers.is_empty() {
            return;
        }
        self.emit(&build());
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
