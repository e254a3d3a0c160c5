//! Invocation and reporting helpers shared by both registry flavours.
//!
//! Every callback runs through [`invoke`], which isolates it with `catch_unwind`:
//! an `Err` return or a panic becomes a [`CallbackFailure`] and the caller moves
//! on to the next subscription.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a callback uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::args::{Arg, Args};
use crate::core::table::{Claim, Removal};
use crate::core::SubscriptionId;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{CallbackError, CallbackFailure};
use crate::observers::ObserverSet;

/// Calls one claimed callback.
///
/// `list` is the event name the subscription lives under, `source` the published
/// name (they differ for wildcard dispatch). Typed claims receive `source` first.
pub(crate) fn invoke(
    claim: &Claim,
    list: &Arc<str>,
    source: &Arc<str>,
    args: &Args,
) -> Result<(), CallbackFailure> {
    let typed;
    let call_args = if claim.typed {
        typed = args.prepended(Arg::new(source.to_string()));
        &typed
    } else {
        args
    };

    catch_unwind(AssertUnwindSafe(|| claim.callback.call(call_args)))
        .unwrap_or_else(|payload| {
            Err(CallbackError::Panicked {
                info: panic_message(payload.as_ref()),
            })
        })
        .map_err(|error| CallbackFailure {
            event: Arc::clone(list),
            subscription: claim.id,
            error,
        })
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Reports a removal on one name: `Unsubscribed` if anything went, `EventRetired` if the key did.
pub(crate) fn report_removal(
    observers: &ObserverSet,
    name: &str,
    removal: Removal,
    id: Option<SubscriptionId>,
) {
    if removal.removed > 0 {
        observers.emit_with(|| {
            let d = Diagnostic::new(DiagnosticKind::Unsubscribed)
                .with_event(name)
                .with_count(removal.removed);
            match id {
                Some(id) => d.with_subscription(id),
                None => d,
            }
        });
    }
    if removal.retired {
        report_retired(observers, name);
    }
}

#[inline]
pub(crate) fn report_retired(observers: &ObserverSet, name: &str) {
    observers.emit_with(|| Diagnostic::new(DiagnosticKind::EventRetired).with_event(name));
}

pub(crate) fn report_subscribed(observers: &ObserverSet, spec: &str, id: SubscriptionId) {
    for name in crate::core::table::event_names(spec) {
        observers.emit_with(|| {
            Diagnostic::new(DiagnosticKind::Subscribed)
                .with_event(name)
                .with_subscription(id)
        });
    }
}

pub(crate) fn report_dispatched(
    observers: &ObserverSet,
    list: &Arc<str>,
    source: &Arc<str>,
    invoked: usize,
) {
    observers.emit_with(|| {
        Diagnostic::new(DiagnosticKind::Dispatched)
            .with_event(Arc::clone(list))
            .with_source(Arc::clone(source))
            .with_count(invoked)
    });
}

pub(crate) fn report_cleared(observers: &ObserverSet, retired: &[String]) {
    for name in retired {
        report_retired(observers, name);
    }
    observers.emit_with(|| Diagnostic::new(DiagnosticKind::Cleared).with_count(retired.len()));
}
