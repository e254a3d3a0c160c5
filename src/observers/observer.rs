//! # Diagnostic observer trait.
//!
//! Provides [`Observe`], the extension point for plugging error sinks, logging
//! or metrics into a registry.
//!
//! ## Rules
//! - Observers are called synchronously, on the thread that produced the diagnostic:
//!   the publishing thread for [`Observable`](crate::Observable), the per-event worker
//!   for [`WorkerObservable`](crate::WorkerObservable).
//! - [`Observable`](crate::Observable) may call observers while holding its lock, so an
//!   observer must never call back into the registry that reports to it.
//! - Panics are caught; a panicking observer does not affect the others.
//!
//! ## Example
//! ```rust
//! use observable::{Diagnostic, Observe};
//!
//! struct Alerts;
//!
//! impl Observe for Alerts {
//!     fn on_diagnostic(&self, d: &Diagnostic) {
//!         if d.is_failure() {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "alerts" }
//! }
//! ```

use crate::diagnostics::Diagnostic;

/// Diagnostic observer.
///
/// ### Implementation requirements
/// - Keep it fast; it runs inline with registry operations.
/// - Handle errors internally; do not panic.
pub trait Observe: Send + Sync + 'static {
    /// Processes a single diagnostic.
    fn on_diagnostic(&self, diagnostic: &Diagnostic);

    /// Returns the observer name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
