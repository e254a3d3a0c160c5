//! Registry core: subscription table, dispatch and workers.
//!
//! Internal modules:
//! - [`table`]: event name → ordered subscriptions, removal and once-claiming rules;
//! - [`dispatch`]: isolated callback invocation and diagnostic reporting;
//! - [`observable`]: synchronous registry dispatching under one lock;
//! - [`worker`]: per-event worker task and its handle;
//! - [`worker_observable`]: registry dispatching through per-event workers;
//! - [`config`] and [`builder`]: construction.

mod builder;
mod config;
mod dispatch;
mod observable;
mod table;
mod worker;
mod worker_observable;

pub use builder::Builder;
pub use config::Config;
pub use observable::Observable;
pub use table::{SubscriptionId, WILDCARD};
pub use worker_observable::WorkerObservable;
