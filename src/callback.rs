//! # Callback handles.
//!
//! [`Callback`] is the invocable stored in every subscription. It wraps an `Arc`,
//! so cloning it keeps the *same* identity: `off(spec, Some(&cb))` removes every
//! subscription that was registered with a clone of `cb`.
//!
//! Two closures with identical bodies are still different callbacks. Keep a
//! `Callback` around (or use the [`SubscriptionId`](crate::SubscriptionId) returned
//! by `subscribe`) when you need to unsubscribe later.

use std::fmt;
use std::sync::Arc;

use crate::args::Args;
use crate::error::CallbackError;

/// Result every callback returns.
pub type CallbackResult = Result<(), CallbackError>;

type CallbackFn = dyn Fn(&Args) -> CallbackResult + Send + Sync + 'static;

/// Shared, comparable callback handle.
#[derive(Clone)]
pub struct Callback {
    inner: Arc<CallbackFn>,
}

impl Callback {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Args) -> CallbackResult + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self, args: &Args) -> CallbackResult {
        (self.inner)(args)
    }

    /// Identity comparison: `true` only for clones of the same handle.
    #[inline]
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}
