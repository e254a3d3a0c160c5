//! # Per-event delivery worker.
//!
//! One worker exists for every event name that currently has subscriptions in a
//! [`WorkerObservable`](crate::WorkerObservable).
//!
//! ```text
//! trigger("foo") ──► [queue "foo"] ──► worker "foo" ──► claim subs (lock) ──► invoke (no lock)
//!                └─► [queue "*"]   ──► worker "*"   ──► ...
//!
//! off(last "foo" sub) ──► cancel token ──► worker "foo" exits ──► join
//! ```
//!
//! ## Rules
//! - **Per-event FIFO**: one consumer per queue, deliveries are handled in order.
//! - **Serialized callbacks**: two callbacks of the same event never run concurrently.
//! - **Teardown**: cancellation is checked between deliveries (`biased` select), so an
//!   in-flight delivery always completes and nothing is picked up afterwards.
//! - **Generations**: a worker only serves the table entry it was spawned for; a
//!   worker outliving its entry stops at its next delivery.

use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::args::Args;
use crate::core::worker_observable::Shared;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::observers::ObserverSet;

/// Item queued for a worker.
#[derive(Debug)]
pub(crate) enum Delivery {
    /// A publish: `source` is the name that was published.
    Publish { source: Arc<str>, args: Args },
    /// Barrier: acknowledged once every earlier delivery has been handled.
    Flush(oneshot::Sender<()>),
}

/// Registry-side handle of one worker.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    name: Arc<str>,
    generation: u64,
    sender: mpsc::Sender<Delivery>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawns the worker for `name` on `runtime`.
    pub(crate) fn spawn(
        runtime: &Handle,
        name: Arc<str>,
        generation: u64,
        capacity: usize,
        shared: Weak<Shared>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();

        let join = runtime.spawn(run(
            Arc::clone(&name),
            generation,
            receiver,
            cancel.clone(),
            shared,
        ));

        Self {
            name,
            generation,
            sender,
            cancel,
            join,
        }
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub(crate) fn sender(&self) -> mpsc::Sender<Delivery> {
        self.sender.clone()
    }

    /// Signals teardown and waits for the worker to exit.
    ///
    /// Reports `WorkerPanicked` if the task died outside callback isolation.
    pub(crate) async fn retire(self, observers: &ObserverSet) {
        self.cancel.cancel();
        drop(self.sender);

        if let Err(err) = self.join.await {
            if err.is_panic() {
                let info = crate::core::dispatch::panic_message(err.into_panic().as_ref());
                observers.emit_with(|| {
                    Diagnostic::new(DiagnosticKind::WorkerPanicked)
                        .with_event(Arc::clone(&self.name))
                        .with_reason(info)
                });
            }
        }
    }

    /// Signals teardown without waiting.
    ///
    /// Used by the worker on itself and when the registry is dropped.
    pub(crate) fn detach(self) {
        self.cancel.cancel();
    }
}

/// Worker loop: handles deliveries until cancelled, closed, or orphaned.
async fn run(
    name: Arc<str>,
    generation: u64,
    mut receiver: mpsc::Receiver<Delivery>,
    cancel: CancellationToken,
    shared: Weak<Shared>,
) {
    loop {
        let delivery = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            msg = receiver.recv() => match msg {
                Some(delivery) => delivery,
                None => break,
            },
        };

        match delivery {
            Delivery::Flush(ack) => {
                let _ = ack.send(());
            }
            Delivery::Publish { source, args } => {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                if !shared.deliver(&name, generation, &source, &args) {
                    break;
                }
            }
        }
    }

    if let Some(shared) = shared.upgrade() {
        shared.observers().emit_with(|| {
            Diagnostic::new(DiagnosticKind::WorkerStopped).with_event(Arc::clone(&name))
        });
    }
}
