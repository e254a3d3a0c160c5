//! # Diagnostic observers.
//!
//! This module provides the [`Observe`] trait and built-in implementations
//! that receive [`Diagnostic`](crate::Diagnostic)s from a registry.
//!
//! ```text
//! Observable / WorkerObservable ── emit(Diagnostic) ──► ObserverSet
//!                                                          │
//!                                          ┌───────────────┼───────────────┐
//!                                          ▼               ▼               ▼
//!                                      LogWriter        Metrics         Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod observer;
mod set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observer::Observe;
pub use set::ObserverSet;
