//! # Synchronous registry.
//!
//! [`Observable`] dispatches on the publishing thread while holding its single lock.
//!
//! ## Architecture
//! ```text
//! trigger("foo bar", args)
//!     │  lock held for the whole call
//!     ├──► "foo": sub1 ──► sub2 ──► ...      (insertion order)
//!     │           └─ once? mark called, remove, retire key if empty
//!     ├──► "*":   wsub1("foo", args..) ──► ...
//!     ├──► "bar": ...
//!     └──► "*":   wsub1("bar", args..) ──► ...
//! ```
//!
//! ## Rules
//! - Every operation takes the same mutex; dispatch holds it while callbacks run.
//!   A slow callback stalls every other caller of the registry.
//! - A callback must not call back into the registry that is dispatching it
//!   (the mutex is not reentrant: that call deadlocks).
//! - A failing or panicking callback does not stop the loop; failures go to the
//!   observers and, through [`Observable::try_trigger`], back to the publisher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::args::Args;
use crate::callback::{Callback, CallbackResult};
use crate::core::dispatch::{
    invoke, report_cleared, report_dispatched, report_removal, report_retired, report_subscribed,
};
use crate::core::table::{event_names, names_wildcard, SubscriptionId, Table, WILDCARD};
use crate::diagnostics::Diagnostic;
use crate::error::{CallbackFailure, RegistryError};
use crate::observers::ObserverSet;

/// In-process publish/subscribe registry with inline dispatch.
///
/// # Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use observable::{args, Observable};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let o = Observable::new();
///
/// let s = seen.clone();
/// o.on("foo bar", move |args| {
///     s.lock().unwrap().push(args.str(0)?.to_string());
///     Ok(())
/// });
///
/// o.trigger("bar", args![]).trigger("foo", args![]);
/// assert_eq!(*seen.lock().unwrap(), vec!["bar", "foo"]);
/// ```
#[derive(Debug, Default)]
pub struct Observable {
    table: Mutex<Table>,
    observers: ObserverSet,
    next_id: AtomicU64,
}

impl Observable {
    /// Creates an empty registry without observers.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_observers(observers: ObserverSet) -> Self {
        Self {
            table: Mutex::new(Table::default()),
            observers,
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a persistent callback under every name in `spec`.
    pub fn on<F>(&self, spec: &str, f: F) -> &Self
    where
        F: Fn(&Args) -> CallbackResult + Send + Sync + 'static,
    {
        self.subscribe(spec, Callback::new(f), false);
        self
    }

    /// Registers a fire-once callback under every name in `spec`.
    pub fn one<F>(&self, spec: &str, f: F) -> &Self
    where
        F: Fn(&Args) -> CallbackResult + Send + Sync + 'static,
    {
        self.subscribe(spec, Callback::new(f), true);
        self
    }

    /// Like [`on`](Self::on), with a handle that can later be passed to [`off`](Self::off).
    pub fn on_callback(&self, spec: &str, callback: &Callback) -> &Self {
        self.subscribe(spec, callback.clone(), false);
        self
    }

    /// Like [`one`](Self::one), with a handle that can later be passed to [`off`](Self::off).
    pub fn one_callback(&self, spec: &str, callback: &Callback) -> &Self {
        self.subscribe(spec, callback.clone(), true);
        self
    }

    /// Registers `callback` under every name in `spec` and returns its id.
    ///
    /// - One subscription is appended per name; all share the returned id.
    /// - With more than one name, the callback receives the triggering name as its
    ///   first argument.
    /// - An empty spec registers nothing.
    pub fn subscribe(&self, spec: &str, callback: Callback, once: bool) -> SubscriptionId {
        let id = SubscriptionId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut table = self.lock();
        table.insert(spec, id, &callback, once);
        report_subscribed(&self.observers, spec, id);
        id
    }

    /// Removes subscriptions.
    ///
    /// - `Some(callback)`: for every name in `spec`, removes each subscription
    ///   registered with that handle. Emptied names are retired.
    /// - `None` with `"*"` in `spec`: drops every subscription of every event.
    /// - `None` otherwise: no-op.
    pub fn off(&self, spec: &str, callback: Option<&Callback>) -> &Self {
        let mut table = self.lock();
        match callback {
            Some(callback) => {
                for name in event_names(spec) {
                    let removal = table.remove_callback(name, callback);
                    report_removal(&self.observers, name, removal, None);
                }
            }
            None if names_wildcard(spec) => {
                let retired = table.clear();
                report_cleared(&self.observers, &retired);
            }
            None => {}
        }
        self
    }

    /// Drops every subscription (same as `off("*", None)`).
    pub fn off_all(&self) -> &Self {
        self.off(WILDCARD, None)
    }

    /// Variadic form of [`off`](Self::off): zero or one callback.
    ///
    /// # Errors
    /// [`RegistryError::TooManyCallbacks`] for more than one callback; nothing is removed.
    pub fn try_off(&self, spec: &str, callbacks: &[Callback]) -> Result<&Self, RegistryError> {
        match callbacks {
            [] => Ok(self.off(spec, None)),
            [callback] => Ok(self.off(spec, Some(callback))),
            many => Err(RegistryError::TooManyCallbacks { given: many.len() }),
        }
    }

    /// Removes the subscription(s) created by one `subscribe` call.
    ///
    /// Returns `false` if the id is unknown (already removed or fired).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut table = self.lock();
        let removed = table.remove_id(id);
        for (name, removal) in &removed {
            report_removal(&self.observers, name, *removal, Some(id));
        }
        !removed.is_empty()
    }

    /// Publishes `args` under every name in `spec`.
    ///
    /// Callback failures are reported to the observers only; use
    /// [`try_trigger`](Self::try_trigger) to receive them.
    pub fn trigger(&self, spec: &str, args: Args) -> &Self {
        let _ = self.dispatch(spec, &args);
        self
    }

    /// Publishes `args` under every name in `spec` and returns the callback failures.
    ///
    /// # Errors
    /// [`RegistryError::DispatchFailed`] if at least one callback failed. Every
    /// applicable callback was still invoked.
    pub fn try_trigger(&self, spec: &str, args: Args) -> Result<(), RegistryError> {
        let failures = self.dispatch(spec, &args);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::DispatchFailed { failures })
        }
    }

    /// Returns `true` if `name` has at least one subscription.
    pub fn has_event(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Number of subscriptions registered under `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.lock().count(name)
    }

    /// Sorted names of every event with subscriptions.
    pub fn event_names(&self) -> Vec<String> {
        self.lock().names()
    }

    /// Returns `true` if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn dispatch(&self, spec: &str, args: &Args) -> Vec<CallbackFailure> {
        let mut table = self.lock();
        let mut failures = Vec::new();
        let wildcard: Arc<str> = Arc::from(WILDCARD);

        for name in event_names(spec) {
            let source: Arc<str> = Arc::from(name);
            self.dispatch_list(&mut table, &source, &source, args, &mut failures);
            if name != WILDCARD {
                self.dispatch_list(&mut table, &wildcard, &source, args, &mut failures);
            }
        }
        failures
    }

    fn dispatch_list(
        &self,
        table: &mut Table,
        list: &Arc<str>,
        source: &Arc<str>,
        args: &Args,
        failures: &mut Vec<CallbackFailure>,
    ) {
        if !table.contains(list) {
            return;
        }

        let mut invoked = 0;
        let retired = table.dispatch_in_place(list, |claim| {
            invoked += 1;
            if let Err(failure) = invoke(claim, list, source, args) {
                self.observers
                    .emit_with(|| Diagnostic::callback_failure(&failure));
                failures.push(failure);
            }
        });

        report_dispatched(&self.observers, list, source, invoked);
        if retired {
            report_retired(&self.observers, list);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // Callbacks and observers run under catch_unwind, so poisoning only
        // follows a bug in the registry itself; the table is still consistent.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
