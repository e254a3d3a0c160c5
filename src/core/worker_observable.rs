//! # Worker-per-event registry.
//!
//! [`WorkerObservable`] decouples publishing from callback execution: each event
//! name with subscriptions owns a worker task and a bounded delivery queue.
//!
//! ## Architecture
//! ```text
//! on/one/off ──► lock ──► Table + workers (bookkeeping only)
//!                              │ first sub of a name  → spawn worker
//!                              │ last sub of a name   → cancel + join worker
//!
//! trigger("foo", args)
//!     ├──► [queue "foo"] ──► worker "foo" ──► callbacks (outside the lock)
//!     └──► [queue "*"]   ──► worker "*"   ──► wildcard callbacks ("foo", args..)
//! ```
//!
//! ## Rules
//! - The lock only guards bookkeeping; callbacks run on the workers without it, so a
//!   slow callback for `A` never delays `B`.
//! - Observers are called after the lock is released, so they may query the registry.
//! - A name emptied by a once-claim keeps its worker until the claimed callbacks return;
//!   a subscribe in between is served by that same worker.
//! - Deliveries to one event are FIFO and serialized.
//! - `trigger` returns once the deliveries are queued. Failures cannot reach the
//!   publisher: they are reported to the observers (`CallbackFailed` / `CallbackPanicked`).
//! - A full queue makes `trigger` wait; nothing is dropped.
//! - Removing the last subscription of a name cancels and joins its worker before
//!   `off` returns.
//! - Must be created inside a Tokio runtime (or given a [`Handle`] through the
//!   [`Builder`](crate::Builder)); workers are spawned on that runtime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::args::Args;
use crate::callback::{Callback, CallbackResult};
use crate::core::config::Config;
use crate::core::dispatch::{
    invoke, report_cleared, report_dispatched, report_removal, report_retired, report_subscribed,
};
use crate::core::table::{event_names, names_wildcard, SubscriptionId, Table, WILDCARD};
use crate::core::worker::{Delivery, WorkerHandle};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::RegistryError;
use crate::observers::ObserverSet;

/// Bookkeeping guarded by the registry lock.
///
/// Invariant: every name present in `table` has an entry in `workers`. A name emptied
/// by a once-claim keeps its worker until the claimed callbacks have run.
#[derive(Debug, Default)]
struct State {
    table: Table,
    workers: HashMap<String, WorkerHandle>,
    next_generation: u64,
}

impl State {
    /// Returns `true` if the worker of `name` is the one spawned as `generation`.
    fn owns(&self, name: &str, generation: u64) -> bool {
        self.workers
            .get(name)
            .is_some_and(|worker| worker.generation() == generation)
    }
}

/// State shared between the registry handles and (weakly) the workers.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<State>,
    observers: ObserverSet,
    config: Config,
    runtime: Handle,
    next_id: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub(crate) fn observers(&self) -> &ObserverSet {
        &self.observers
    }

    /// Handles one publish on the worker of `name`.
    ///
    /// Claims the subscriptions under the lock (consuming `once` ones), then invokes
    /// them without it. Returns `false` when the worker must stop: its entry is gone
    /// or was replaced, or this delivery emptied the name and nothing re-subscribed
    /// it while the callbacks ran.
    pub(crate) fn deliver(
        &self,
        name: &Arc<str>,
        generation: u64,
        source: &Arc<str>,
        args: &Args,
    ) -> bool {
        let (claims, emptied) = {
            let mut state = self.lock();
            if !state.owns(name, generation) {
                return false;
            }
            state.table.claim(name)
        };

        if emptied {
            report_retired(&self.observers, name);
        }

        for claim in &claims {
            if let Err(failure) = invoke(claim, name, source, args) {
                self.observers
                    .emit_with(|| Diagnostic::callback_failure(&failure));
            }
        }
        report_dispatched(&self.observers, name, source, claims.len());

        if !emptied {
            return true;
        }

        // Retire only if nothing re-subscribed `name` while the callbacks ran.
        let handle = {
            let mut state = self.lock();
            if !state.owns(name, generation) {
                return false;
            }
            if state.table.contains(name) {
                return true;
            }
            state.workers.remove(&**name)
        };
        if let Some(handle) = handle {
            handle.detach();
        }
        false
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, worker) in state.workers.drain() {
            worker.detach();
        }
    }
}

/// In-process publish/subscribe registry with one worker task per event name.
///
/// Cheap to clone: clones share the same registry.
///
/// # Example
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use observable::{args, WorkerObservable};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let hits = Arc::new(AtomicUsize::new(0));
///     let o = WorkerObservable::new();
///
///     let h = hits.clone();
///     o.one("ready", move |_| {
///         h.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     });
///
///     o.trigger("ready", args![]).await.trigger("ready", args![]).await;
///     o.flush().await;
///
///     assert_eq!(hits.load(Ordering::SeqCst), 1);
///     assert!(!o.has_event("ready"));
/// }
/// ```
#[derive(Clone, Debug)]
pub struct WorkerObservable {
    shared: Arc<Shared>,
}

impl WorkerObservable {
    /// Creates an empty registry bound to the current Tokio runtime.
    ///
    /// # Panics
    /// Outside of a Tokio runtime. Use [`Builder::runtime`](crate::Builder::runtime)
    /// to bind another one explicitly.
    pub fn new() -> Self {
        Self::from_parts(Config::default(), ObserverSet::default(), Handle::current())
    }

    pub(crate) fn from_parts(config: Config, observers: ObserverSet, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                observers,
                config,
                runtime,
                next_id: AtomicU64::new(0),
            }),
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
    /// Spawns a worker for each name that had no subscriptions yet.
    pub fn subscribe(&self, spec: &str, callback: Callback, once: bool) -> SubscriptionId {
        let shared = &self.shared;
        let id = SubscriptionId::from_raw(shared.next_id.fetch_add(1, Ordering::Relaxed));

        let started = {
            let mut state = shared.lock();
            let created = state.table.insert(spec, id, &callback, once);
            let mut started = Vec::new();
            for name in created {
                // A worker still finishing the delivery that emptied `name` keeps serving it.
                if state.workers.contains_key(&name) {
                    continue;
                }
                state.next_generation += 1;
                let worker = WorkerHandle::spawn(
                    &shared.runtime,
                    Arc::from(name.as_str()),
                    state.next_generation,
                    shared.config.queue_capacity_clamped(),
                    Arc::downgrade(shared),
                );
                state.workers.insert(name.clone(), worker);
                started.push(name);
            }
            started
        };

        for name in started {
            shared.observers.emit_with(|| {
                Diagnostic::new(DiagnosticKind::WorkerStarted).with_event(name.as_str())
            });
        }
        report_subscribed(&shared.observers, spec, id);
        id
    }

    /// Removes subscriptions; see [`Observable::off`](crate::Observable::off).
    ///
    /// Workers of emptied names are cancelled and joined before this returns.
    pub async fn off(&self, spec: &str, callback: Option<&Callback>) -> &Self {
        let mut removals = Vec::new();
        let mut cleared = None;
        let retired = {
            let mut state = self.shared.lock();
            let mut retired = Vec::new();
            match callback {
                Some(callback) => {
                    for name in event_names(spec) {
                        let removal = state.table.remove_callback(name, callback);
                        if removal.retired {
                            retired.extend(state.workers.remove(name));
                        }
                        removals.push((name, removal));
                    }
                }
                None if names_wildcard(spec) => {
                    cleared = Some(state.table.clear());
                    retired.extend(state.workers.drain().map(|(_, worker)| worker));
                }
                None => {}
            }
            retired
        };

        for (name, removal) in removals {
            report_removal(&self.shared.observers, name, removal, None);
        }
        if let Some(names) = cleared {
            report_cleared(&self.shared.observers, &names);
        }
        for worker in retired {
            worker.retire(&self.shared.observers).await;
        }
        self
    }

    /// Drops every subscription and stops every worker.
    pub async fn off_all(&self) -> &Self {
        self.off(WILDCARD, None).await
    }

    /// Variadic form of [`off`](Self::off): zero or one callback.
    ///
    /// # Errors
    /// [`RegistryError::TooManyCallbacks`] for more than one callback; nothing is removed.
    pub async fn try_off(
        &self,
        spec: &str,
        callbacks: &[Callback],
    ) -> Result<&Self, RegistryError> {
        match callbacks {
            [] => Ok(self.off(spec, None).await),
            [callback] => Ok(self.off(spec, Some(callback)).await),
            many => Err(RegistryError::TooManyCallbacks { given: many.len() }),
        }
    }

    /// Removes the subscription(s) created by one `subscribe` call.
    ///
    /// Returns `false` if the id is unknown (already removed or fired).
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let (removed, retired) = {
            let mut state = self.shared.lock();
            let removed = state.table.remove_id(id);
            let mut retired = Vec::new();
            for (name, removal) in &removed {
                if removal.retired {
                    retired.extend(state.workers.remove(name.as_str()));
                }
            }
            (removed, retired)
        };

        for (name, removal) in &removed {
            report_removal(&self.shared.observers, name, *removal, Some(id));
        }
        for worker in retired {
            worker.retire(&self.shared.observers).await;
        }
        !removed.is_empty()
    }

    /// Queues `args` for every name in `spec` (and for the wildcard).
    ///
    /// Returns once every delivery is queued; callbacks run later on the workers.
    pub async fn trigger(&self, spec: &str, args: Args) -> &Self {
        for name in event_names(spec) {
            let source: Arc<str> = Arc::from(name);
            for (list, sender) in self.targets(name) {
                let delivery = Delivery::Publish {
                    source: Arc::clone(&source),
                    args: args.clone(),
                };
                if sender.send(delivery).await.is_err() {
                    self.shared.observers.emit_with(|| {
                        Diagnostic::new(DiagnosticKind::DeliveryDropped)
                            .with_event(list.as_str())
                            .with_source(Arc::clone(&source))
                            .with_reason("worker retired")
                    });
                }
            }
        }
        self
    }

    /// Waits until every worker has handled everything queued before this call.
    pub async fn flush(&self) {
        let senders: Vec<mpsc::Sender<Delivery>> = {
            let state = self.shared.lock();
            state.workers.values().map(WorkerHandle::sender).collect()
        };

        let mut acks = Vec::with_capacity(senders.len());
        for sender in senders {
            let (tx, rx) = oneshot::channel();
            if sender.send(Delivery::Flush(tx)).await.is_ok() {
                acks.push(rx);
            }
        }
        for ack in acks {
            // A worker that retired meanwhile drops the ack; nothing is left to wait for.
            let _ = ack.await;
        }
    }

    /// Handles everything already queued, then drops every subscription and stops
    /// every worker.
    pub async fn shutdown(&self) {
        self.flush().await;
        self.off_all().await;
    }

    /// Returns `true` if `name` has at least one subscription.
    pub fn has_event(&self, name: &str) -> bool {
        self.shared.lock().table.contains(name)
    }

    /// Number of subscriptions registered under `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.shared.lock().table.count(name)
    }

    /// Sorted names of every event with subscriptions.
    pub fn event_names(&self) -> Vec<String> {
        self.shared.lock().table.names()
    }

    /// Number of live workers (one per subscribed event name).
    pub fn worker_count(&self) -> usize {
        self.shared.lock().workers.len()
    }

    /// Returns `true` if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().table.is_empty()
    }

    /// Senders for the queues a publish of `name` goes to: its own, then the wildcard's.
    fn targets(&self, name: &str) -> Vec<(String, mpsc::Sender<Delivery>)> {
        let state = self.shared.lock();
        let mut targets = Vec::with_capacity(2);
        if let Some(worker) = state.workers.get(name) {
            targets.push((name.to_string(), worker.sender()));
        }
        if name != WILDCARD {
            if let Some(worker) = state.workers.get(WILDCARD) {
                targets.push((WILDCARD.to_string(), worker.sender()));
            }
        }
        targets
    }
}

impl Default for WorkerObservable {
    /// Same as [`WorkerObservable::new`].
    ///
    /// # Panics
    /// Outside of a Tokio runtime.
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::error::CallbackError;
    use crate::observers::testing::Recorder;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counter() -> (Arc<AtomicUsize>, Callback) {
        let n = Arc::new(AtomicUsize::new(0));
        let c = n.clone();
        let cb = Callback::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (n, cb)
    }

    fn recorder() -> (Arc<Recorder>, WorkerObservable) {
        let rec = Arc::new(Recorder::default());
        let o = WorkerObservable::from_parts(
            Config::default(),
            ObserverSet::new(vec![rec.clone()]),
            Handle::current(),
        );
        (rec, o)
    }

    #[tokio::test]
    async fn test_worker_lifecycle_follows_subscriptions() {
        let o = WorkerObservable::new();
        let (_, cb) = counter();

        o.on_callback("foo bar", &cb);
        assert_eq!(o.worker_count(), 2);

        o.off("foo", Some(&cb)).await;
        assert_eq!(o.worker_count(), 1);
        assert_eq!(o.event_names(), vec!["bar".to_string()]);

        o.off("*", None).await;
        assert_eq!(o.worker_count(), 0);
        assert!(o.is_empty());
    }

    #[tokio::test]
    async fn test_fifo_order_per_event() {
        let o = WorkerObservable::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();

        o.on("foo", move |args| {
            s.lock().unwrap().push(*args.get::<u32>(0)?);
            Ok(())
        });
        for i in 0..100u32 {
            o.trigger("foo", args![i]).await;
        }
        o.flush().await;

        assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_insertion_order_within_event() {
        let o = WorkerObservable::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["f1", "f2"] {
            let s = seen.clone();
            o.on("foo", move |_| {
                s.lock().unwrap().push(tag);
                Ok(())
            });
        }
        let s = seen.clone();
        o.on("bar", move |_| {
            s.lock().unwrap().push("g");
            Ok(())
        });

        o.trigger("foo", args![]).await;
        o.flush().await;

        assert_eq!(*seen.lock().unwrap(), vec!["f1", "f2"]);
    }

    #[tokio::test]
    async fn test_one_fires_once_and_retires_worker() {
        let o = WorkerObservable::new();
        let (n, cb) = counter();

        o.one_callback("foo", &cb);
        o.trigger("foo", args![]).await.trigger("foo", args![]).await;
        o.flush().await;

        assert_eq!(n.load(Ordering::SeqCst), 1);
        assert!(!o.has_event("foo"));
        assert_eq!(o.worker_count(), 0);

        o.trigger("foo", args![]).await;
        o.flush().await;
        assert_eq!(n.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_multi_name_and_wildcard_prefix() {
        let o = WorkerObservable::new();
        let named = Arc::new(Mutex::new(Vec::new()));
        let all = Arc::new(Mutex::new(Vec::new()));

        let n = named.clone();
        o.on("foo bar", move |args| {
            n.lock().unwrap().push(args.str(0)?.to_string());
            Ok(())
        });
        let a = all.clone();
        o.on("*", move |args| {
            a.lock().unwrap().push(args.str(0)?.to_string());
            Ok(())
        });

        o.trigger("foo", args![]).await;
        o.flush().await;
        o.trigger("bar", args![]).await;
        o.trigger("*", args![]).await;
        o.flush().await;

        assert_eq!(*named.lock().unwrap(), vec!["foo", "bar"]);
        assert_eq!(*all.lock().unwrap(), vec!["foo", "bar", "*"]);
    }

    #[tokio::test]
    async fn test_failures_go_to_observers() {
        let (rec, o) = recorder();
        let (n, cb) = counter();

        o.on("foo", |args| args.get::<bool>(0).map(|_| ()));
        o.on("foo", |_| Err(CallbackError::fail("nope")));
        o.on_callback("foo", &cb);

        o.trigger("foo", args![7i64]).await;
        o.flush().await;

        assert_eq!(n.load(Ordering::SeqCst), 1);
        let failed = rec.of(DiagnosticKind::CallbackFailed);
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].event.as_deref(), Some("foo"));
        assert_eq!(rec.of(DiagnosticKind::WorkerStarted).len(), 1);
    }

    #[tokio::test]
    async fn test_off_joins_worker_after_in_flight_callback() {
        let (rec, o) = recorder();
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        let slow = Callback::new(move |_| {
            std::thread::sleep(Duration::from_millis(50));
            d.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        o.on_callback("foo", &slow);
        o.trigger("foo", args![]).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        o.off("foo", Some(&slow)).await;

        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(o.worker_count(), 0);
        assert_eq!(rec.of(DiagnosticKind::WorkerStopped).len(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_and_try_off() {
        let o = WorkerObservable::new();
        let (n, cb) = counter();
        let (_, other) = counter();

        let id = o.subscribe("foo bar", cb.clone(), false);
        assert!(o.unsubscribe(id).await);
        assert!(!o.unsubscribe(id).await);
        assert_eq!(o.worker_count(), 0);

        o.on_callback("foo", &cb);
        assert!(o.try_off("foo", &[cb.clone(), other]).await.is_err());
        assert!(o.has_event("foo"));
        assert!(o.try_off("foo", &[cb]).await.is_ok());
        assert!(!o.has_event("foo"));
        assert_eq!(n.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let (rec, o) = recorder();
        o.trigger("nobody", args![1u8]).await;
        o.flush().await;
        assert!(rec.all().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_triggers_count_exactly() {
        let o = WorkerObservable::new();
        let (n, cb) = counter();
        o.on_callback("foo", &cb);

        let publishers = 50;
        let per = 20;
        let mut tasks = Vec::with_capacity(publishers);
        for _ in 0..publishers {
            let o = o.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..per {
                    o.trigger("foo", args![]).await;
                }
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        o.flush().await;

        assert_eq!(n.load(Ordering::SeqCst), publishers * per);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_one_fires_once() {
        let o = WorkerObservable::new();
        let (n, cb) = counter();
        o.one_callback("foo", &cb);

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let o = o.clone();
            tasks.push(tokio::spawn(async move {
                o.trigger("foo", args![]).await;
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        o.flush().await;

        assert_eq!(n.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_event_does_not_block_other_event() {
        let o = WorkerObservable::new();
        let fast = Arc::new(AtomicUsize::new(0));
        let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
        let gate_rx = Mutex::new(gate_rx);

        o.on("slow", move |_| {
            let _ = gate_rx
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5));
            Ok(())
        });
        let f = fast.clone();
        o.on("fast", move |_| {
            f.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        o.trigger("slow", args![]).await;
        o.trigger("fast", args![]).await;

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while fast.load(Ordering::SeqCst) == 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(fast.load(Ordering::SeqCst), 1);

        gate_tx.send(()).unwrap();
        o.shutdown().await;
        assert!(o.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_resubscribe_during_once_callback_keeps_event_serialized() {
        let (rec, o) = recorder();
        let log = Arc::new(Mutex::new(Vec::new()));
        let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
        let gate_rx = Mutex::new(gate_rx);

        let l = log.clone();
        o.one("foo", move |_| {
            l.lock().unwrap().push("h:start");
            let _ = gate_rx
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5));
            l.lock().unwrap().push("h:end");
            Ok(())
        });
        o.trigger("foo", args![]).await;

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while log.lock().unwrap().is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!o.has_event("foo"));

        // "foo" is empty again, but its worker is still inside `h`.
        let l = log.clone();
        o.on("foo", move |_| {
            l.lock().unwrap().push("g");
            Ok(())
        });
        assert_eq!(o.worker_count(), 1);
        o.trigger("foo", args![]).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*log.lock().unwrap(), vec!["h:start"]);

        gate_tx.send(()).unwrap();
        o.flush().await;

        assert_eq!(*log.lock().unwrap(), vec!["h:start", "h:end", "g"]);
        assert!(o.has_event("foo"));
        assert_eq!(o.worker_count(), 1);
        assert_eq!(rec.of(DiagnosticKind::WorkerStarted).len(), 1);
    }

    #[tokio::test]
    async fn test_once_emptied_event_retires_worker_after_callbacks() {
        let (rec, o) = recorder();
        let (n, cb) = counter();

        o.one_callback("foo", &cb);
        o.trigger("foo", args![]).await;
        o.flush().await;

        assert_eq!(n.load(Ordering::SeqCst), 1);
        assert_eq!(o.worker_count(), 0);
        assert_eq!(rec.of(DiagnosticKind::EventRetired).len(), 1);

        // A later subscribe gets a fresh worker.
        o.on_callback("foo", &cb);
        o.trigger("foo", args![]).await;
        o.flush().await;

        assert_eq!(n.load(Ordering::SeqCst), 2);
        assert_eq!(o.worker_count(), 1);
        assert_eq!(rec.of(DiagnosticKind::WorkerStarted).len(), 2);
    }

    /// Observer that queries the registry it observes.
    #[derive(Default)]
    struct Introspecting {
        registry: std::sync::OnceLock<WorkerObservable>,
        counts: Mutex<Vec<usize>>,
    }

    impl crate::observers::Observe for Introspecting {
        fn on_diagnostic(&self, _: &Diagnostic) {
            if let Some(o) = self.registry.get() {
                let n = o.listener_count("foo");
                let _ = o.has_event("foo");
                let _ = o.worker_count();
                self.counts.lock().unwrap().push(n);
            }
        }
    }

    #[tokio::test]
    async fn test_observer_may_query_registry_from_bookkeeping() {
        let obs = Arc::new(Introspecting::default());
        let o = WorkerObservable::from_parts(
            Config::default(),
            ObserverSet::new(vec![obs.clone()]),
            Handle::current(),
        );
        obs.registry.set(o.clone()).unwrap();
        let (_, cb) = counter();

        o.on_callback("foo", &cb);
        o.trigger("foo", args![]).await;
        o.flush().await;
        o.off("foo", Some(&cb)).await;

        let id = o.subscribe("bar", cb.clone(), false);
        assert!(o.unsubscribe(id).await);
        o.on_callback("foo", &cb);
        o.off_all().await;

        assert!(o.is_empty());
        let counts = obs.counts.lock().unwrap().clone();
        assert!(counts.contains(&1));
        assert!(counts.contains(&0));
    }

    #[tokio::test]
    async fn test_default_binds_current_runtime() {
        let o = WorkerObservable::default();
        let (n, cb) = counter();

        o.on_callback("foo", &cb);
        o.trigger("foo", args![]).await;
        o.shutdown().await;

        assert_eq!(n.load(Ordering::SeqCst), 1);
        assert!(o.is_empty());
    }
}
