//! # Subscription table shared by both registry flavours.
//!
//! Maps an event name to the ordered list of its subscriptions. The table itself
//! has no lock; [`Observable`](crate::Observable) and
//! [`WorkerObservable`](crate::WorkerObservable) own it behind their mutex.
//!
//! ## Rules
//! - Subscriptions are appended; dispatch walks them in insertion order.
//! - A name whose list becomes empty is removed immediately (no empty keys).
//! - Emptiness is checked per individual name, never per event spec.

use std::collections::HashMap;
use std::fmt;

use crate::callback::Callback;

/// Reserved event name whose subscribers receive every published event.
pub const WILDCARD: &str = "*";

/// Splits an event spec into individual event names.
#[inline]
pub(crate) fn event_names(spec: &str) -> impl Iterator<Item = &str> {
    spec.split_whitespace()
}

/// Returns `true` if any name in `spec` is the wildcard.
pub(crate) fn names_wildcard(spec: &str) -> bool {
    event_names(spec).any(|name| name == WILDCARD)
}

/// Token identifying one `subscribe` call.
///
/// A multi-name registration shares a single id across all its names, so
/// `unsubscribe(id)` removes it everywhere at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[inline]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value (unique per registry).
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One registered callback bound to one event name.
#[derive(Debug)]
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) callback: Callback,
    pub(crate) once: bool,
    /// Registered through a spec naming more than one event.
    pub(crate) multi_named: bool,
    /// Set on the first invocation of a `once` subscription.
    pub(crate) called: bool,
}

impl Subscription {
    /// Whether the triggering event name is passed as the first argument.
    ///
    /// Wildcard subscriptions always receive it.
    #[inline]
    pub(crate) fn typed(&self, list: &str) -> bool {
        self.multi_named || list == WILDCARD
    }
}

/// A callback claimed for invocation, detached from the table.
#[derive(Debug, Clone)]
pub(crate) struct Claim {
    pub(crate) id: SubscriptionId,
    pub(crate) callback: Callback,
    pub(crate) typed: bool,
}

/// Outcome of a removal on one event name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Removal {
    pub(crate) removed: usize,
    /// The name's list became empty and its key was deleted.
    pub(crate) retired: bool,
}

/// Event name → ordered subscriptions.
#[derive(Debug, Default)]
pub(crate) struct Table {
    events: HashMap<String, Vec<Subscription>>,
}

impl Table {
    /// Appends one subscription per name in `spec`.
    ///
    /// Returns the names that did not exist before the call (new keys), in spec order.
    pub(crate) fn insert(
        &mut self,
        spec: &str,
        id: SubscriptionId,
        callback: &Callback,
        once: bool,
    ) -> Vec<String> {
        let multi_named = event_names(spec).nth(1).is_some();
        let mut created = Vec::new();

        for name in event_names(spec) {
            let list = self.events.entry(name.to_string()).or_insert_with(|| {
                created.push(name.to_string());
                Vec::new()
            });
            list.push(Subscription {
                id,
                callback: callback.clone(),
                once,
                multi_named,
                called: false,
            });
        }
        created
    }

    /// Removes every subscription under `name` whose callback is `callback`.
    pub(crate) fn remove_callback(&mut self, name: &str, callback: &Callback) -> Removal {
        self.remove_where(name, |sub| sub.callback.ptr_eq(callback))
    }

    /// Removes subscription `id` from every name it is registered under.
    ///
    /// Returns `(name, removal)` for each name that lost a subscription.
    pub(crate) fn remove_id(&mut self, id: SubscriptionId) -> Vec<(String, Removal)> {
        let mut names: Vec<String> = self
            .events
            .iter()
            .filter(|(_, list)| list.iter().any(|sub| sub.id == id))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();

        names
            .into_iter()
            .map(|name| {
                let removal = self.remove_where(&name, |sub| sub.id == id);
                (name, removal)
            })
            .collect()
    }

    /// Drops every subscription; returns the retired names (sorted).
    pub(crate) fn clear(&mut self) -> Vec<String> {
        let mut names: Vec<String> = self.events.drain().map(|(name, _)| name).collect();
        names.sort_unstable();
        names
    }

    /// Claims the subscriptions under `name` for one dispatch, in order.
    ///
    /// `once` subscriptions are marked `called` and removed as part of the claim,
    /// so no later claim can return them again. Returns the claims and whether the
    /// name was retired because its list became empty.
    pub(crate) fn claim(&mut self, name: &str) -> (Vec<Claim>, bool) {
        let Some(list) = self.events.get_mut(name) else {
            return (Vec::new(), false);
        };

        let mut claims = Vec::with_capacity(list.len());
        for sub in list.iter_mut() {
            if sub.once && sub.called {
                continue;
            }
            claims.push(Claim {
                id: sub.id,
                callback: sub.callback.clone(),
                typed: sub.typed(name),
            });
            if sub.once {
                sub.called = true;
            }
        }

        let removal = self.remove_where(name, |sub| sub.once && sub.called);
        (claims, removal.retired)
    }

    /// Invokes `f` for each live subscription under `name`, in order, while the
    /// table stays borrowed; `once` subscriptions are removed right after their call.
    ///
    /// Returns whether the name was retired.
    pub(crate) fn dispatch_in_place<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&Claim),
    {
        let mut index = 0;
        loop {
            let Some(list) = self.events.get_mut(name) else {
                return false;
            };
            let Some(sub) = list.get_mut(index) else {
                return false;
            };

            if sub.once && sub.called {
                index += 1;
                continue;
            }

            let claim = Claim {
                id: sub.id,
                callback: sub.callback.clone(),
                typed: sub.typed(name),
            };
            if sub.once {
                sub.called = true;
            }
            let once = sub.once;
            let id = sub.id;

            f(&claim);

            if once {
                let removal = self.remove_where(name, |s| s.id == id && s.once && s.called);
                if removal.retired {
                    return true;
                }
            } else {
                index += 1;
            }
        }
    }

    /// Returns `true` if `name` has at least one subscription.
    #[inline]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    /// Number of subscriptions under `name`.
    pub(crate) fn count(&self, name: &str) -> usize {
        self.events.get(name).map_or(0, Vec::len)
    }

    /// Sorted list of event names that have subscriptions.
    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn remove_where<P>(&mut self, name: &str, mut pred: P) -> Removal
    where
        P: FnMut(&Subscription) -> bool,
    {
        let Some(list) = self.events.get_mut(name) else {
            return Removal::default();
        };

        let before = list.len();
        list.retain(|sub| !pred(sub));
        let removed = before - list.len();

        let retired = list.is_empty();
        if retired {
            self.events.remove(name);
        }
        Removal { removed, retired }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Callback::new(|_| Ok(()))
    }

    #[test]
    fn test_insert_reports_new_keys_and_flags() {
        let mut t = Table::default();
        let cb = noop();

        let created = t.insert("foo bar", SubscriptionId(1), &cb, false);
        assert_eq!(created, vec!["foo".to_string(), "bar".to_string()]);

        let created = t.insert("foo", SubscriptionId(2), &cb, true);
        assert!(created.is_empty());

        let foo = &t.events["foo"];
        assert_eq!(foo.len(), 2);
        assert!(foo[0].multi_named);
        assert!(!foo[1].multi_named);
        assert!(foo[1].once);
    }

    #[test]
    fn test_remove_callback_retires_per_name() {
        let mut t = Table::default();
        let a = noop();
        let b = noop();

        t.insert("foo bar", SubscriptionId(1), &a, false);
        t.insert("bar", SubscriptionId(2), &b, false);

        let r = t.remove_callback("foo", &a);
        assert_eq!(r, Removal { removed: 1, retired: true });
        assert!(!t.contains("foo"));

        let r = t.remove_callback("bar", &a);
        assert_eq!(r, Removal { removed: 1, retired: false });
        assert_eq!(t.count("bar"), 1);

        let r = t.remove_callback("nope", &a);
        assert_eq!(r, Removal::default());
    }

    #[test]
    fn test_remove_id_covers_all_names() {
        let mut t = Table::default();
        let a = noop();
        t.insert("foo bar baz", SubscriptionId(9), &a, false);
        t.insert("baz", SubscriptionId(10), &a, false);

        let removed = t.remove_id(SubscriptionId(9));
        let names: Vec<&str> = removed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["bar", "baz", "foo"]);
        assert_eq!(t.names(), vec!["baz".to_string()]);
    }

    #[test]
    fn test_claim_consumes_once() {
        let mut t = Table::default();
        let a = noop();
        let b = noop();
        t.insert("foo", SubscriptionId(1), &a, true);
        t.insert("foo", SubscriptionId(2), &b, false);

        let (claims, retired) = t.claim("foo");
        assert_eq!(claims.len(), 2);
        assert!(!retired);
        assert_eq!(claims[0].id, SubscriptionId(1));

        let (claims, _) = t.claim("foo");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].id, SubscriptionId(2));
    }

    #[test]
    fn test_claim_retires_when_only_once_left() {
        let mut t = Table::default();
        t.insert("foo", SubscriptionId(1), &noop(), true);

        let (claims, retired) = t.claim("foo");
        assert_eq!(claims.len(), 1);
        assert!(retired);
        assert!(t.is_empty());
    }

    #[test]
    fn test_wildcard_is_always_typed() {
        let mut t = Table::default();
        t.insert("*", SubscriptionId(1), &noop(), false);
        let (claims, _) = t.claim("*");
        assert!(claims[0].typed);
    }

    #[test]
    fn test_dispatch_in_place_order_and_removal() {
        let mut t = Table::default();
        t.insert("foo", SubscriptionId(1), &noop(), false);
        t.insert("foo", SubscriptionId(2), &noop(), true);
        t.insert("foo", SubscriptionId(3), &noop(), false);

        let mut seen = Vec::new();
        let retired = t.dispatch_in_place("foo", |c| seen.push(c.id.as_u64()));
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(!retired);
        assert_eq!(t.count("foo"), 2);

        let mut seen = Vec::new();
        t.dispatch_in_place("foo", |c| seen.push(c.id.as_u64()));
        assert_eq!(seen, vec![1, 3]);
    }

    #[test]
    fn test_event_names_split_on_any_whitespace() {
        let names: Vec<&str> = event_names("  foo\tbar \n baz ").collect();
        assert_eq!(names, vec!["foo", "bar", "baz"]);
        assert!(names_wildcard("foo *"));
        assert!(!names_wildcard("foo"));
    }
}
