//! Registry diagnostics.
//!
//! [`Diagnostic`] records are produced by both registry flavours and delivered to
//! [`Observe`](crate::Observe) implementations through an
//! [`ObserverSet`](crate::ObserverSet).

mod diagnostic;

pub use diagnostic::{Diagnostic, DiagnosticKind};
