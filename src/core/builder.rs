use std::sync::Arc;

use tokio::runtime::Handle;

use super::{config::Config, observable::Observable, worker_observable::WorkerObservable};
use crate::observers::{ObserverSet, Observe};

/// Builder for constructing a registry with observers and configuration.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use observable::{args, Builder, Config, Diagnostic, Observe};
///
/// struct Failures;
///
/// impl Observe for Failures {
///     fn on_diagnostic(&self, d: &Diagnostic) {
///         if d.is_failure() {
///             eprintln!("callback failed: {:?}", d.reason);
///         }
///     }
/// }
///
/// let o = Builder::new(Config::default())
///     .with_observers(vec![Arc::new(Failures)])
///     .build();
///
/// o.on("foo", |args| args.get::<u8>(0).map(|_| ()));
/// o.trigger("foo", args!["wrong type"]);
/// ```
#[derive(Default)]
pub struct Builder {
    cfg: Config,
    observers: Vec<Arc<dyn Observe>>,
    runtime: Option<Handle>,
}

impl Builder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
            runtime: None,
        }
    }

    /// Sets diagnostic observers.
    ///
    /// Observers receive bookkeeping, dispatch and failure diagnostics.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Adds one diagnostic observer.
    pub fn observer(mut self, observer: Arc<dyn Observe>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Runtime the workers of [`build_worker`](Self::build_worker) are spawned on.
    ///
    /// Defaults to the runtime `build_worker` is called from.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Builds a synchronous [`Observable`].
    pub fn build(self) -> Observable {
        Observable::with_observers(ObserverSet::new(self.observers))
    }

    /// Builds a [`WorkerObservable`].
    ///
    /// # Panics
    /// If no runtime was set and this is called outside of a Tokio runtime.
    pub fn build_worker(self) -> WorkerObservable {
        let runtime = self.runtime.unwrap_or_else(Handle::current);
        WorkerObservable::from_parts(self.cfg, ObserverSet::new(self.observers), runtime)
    }
}
