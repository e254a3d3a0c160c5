//! # observable
//!
//! **Observable** is an in-process publish/subscribe event registry for Rust.
//!
//! Callbacks subscribe to named events; publishing a name invokes every callback
//! registered for it, in subscription order, with the published arguments.
//! Subscriptions may be one-shot, may cover several names at once, and may use the
//! wildcard name `"*"` to receive every publish.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!       on("foo bar", cb)        one("baz", cb)          on("*", cb)
//!             │                        │                      │
//!             ▼                        ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Table (event name ─► ordered subscriptions)                      │
//! │  - "foo" : [cb#1]                                                 │
//! │  - "bar" : [cb#1]           (multi-named: receives its name)      │
//! │  - "baz" : [cb#2 once]      (removed on first call)               │
//! │  - "*"   : [cb#3]           (wildcard: receives the source name)  │
//! └──────┬───────────────────────────────────────┬────────────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌──────────────────────────┐     ┌──────────────────────────────────┐
//! │  Observable              │     │  WorkerObservable                │
//! │  - dispatch on caller    │     │  - one Tokio worker per name     │
//! │  - one lock per publish  │     │  - bounded FIFO queue per name   │
//! └──────┬───────────────────┘     └──────┬───────────────────────────┘
//!        │                                │
//!        ▼                                ▼
//!   invoke (catch_unwind) ──► failures/bookkeeping ──► ObserverSet ──► Observe
//! ```
//!
//! ### Publish
//! ```text
//! trigger("foo bar", args)
//!   for name in ["foo", "bar"]:
//!     ├─► subs("foo") in order:  cb(args) or cb(["foo", ..args]) if multi-named
//!     │     └─ once subs removed; "foo" retired when empty
//!     └─► subs("*") in order:    cb(["foo", ..args])
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                           |
//! |-------------------|--------------------------------------------------------------|----------------------------------------------|
//! | **Registries**    | Synchronous and worker-backed dispatch.                      | [`Observable`], [`WorkerObservable`]         |
//! | **Callbacks**     | Identity-comparable callbacks over type-erased arguments.    | [`Callback`], [`Args`], [`Arg`]              |
//! | **Diagnostics**   | Bookkeeping and failure records fanned out to observers.     | [`Observe`], [`Diagnostic`]                  |
//! | **Errors**        | Typed errors for registry operations and callbacks.          | [`RegistryError`], [`CallbackError`]         |
//! | **Configuration** | Worker queue capacity, observers and runtime selection.      | [`Config`], [`Builder`]                      |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] observer emitting `tracing` records.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use observable::{args, Observable};
//!
//! let o = Observable::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let s = Arc::clone(&seen);
//! o.on("ready done", move |args| {
//!     let name = args.str(0)?.to_owned();
//!     let code = *args.get::<i32>(1)?;
//!     s.lock().unwrap().push((name, code));
//!     Ok(())
//! });
//!
//! o.trigger("ready", args![0_i32]).trigger("done", args![1_i32]);
//!
//! assert_eq!(
//!     *seen.lock().unwrap(),
//!     vec![("ready".to_owned(), 0), ("done".to_owned(), 1)]
//! );
//! ```

mod args;
mod callback;
mod core;
mod diagnostics;
mod error;
mod observers;

// ---- Public re-exports ----

pub use args::{Arg, Args};
pub use callback::{Callback, CallbackResult};
pub use crate::core::{Builder, Config, Observable, SubscriptionId, WorkerObservable, WILDCARD};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{CallbackError, CallbackFailure, RegistryError};
pub use observers::{ObserverSet, Observe};

// Optional: expose a simple built-in logger observer.
#[cfg(feature = "logging")]
pub use observers::LogWriter;
