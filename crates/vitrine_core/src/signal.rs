//! Broadcast signals
//!
//! A [`Signal`] is the push side of an inbound host notification (OS dark
//! mode changed, tab hidden, frame presented) or of an engine output (resolved
//! theme changed, budget changed). Listeners register with
//! [`Signal::subscribe`] and receive a [`Subscription`] that unregisters them.
//!
//! Emission snapshots the listener list and releases the lock before any
//! handler runs, so handlers may subscribe, cancel, or emit re-entrantly. A
//! listener cancelled mid-emission is not called afterwards, even within the
//! same emission.

use crate::subscription::Subscription;
use crate::sync::lock;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

new_key_type! {
    /// Identifier of a registered listener
    pub struct ListenerId;
}

type Handler<T> = dyn Fn(&T) + Send + Sync;

struct Listener<T> {
    handler: Box<Handler<T>>,
    active: AtomicBool,
}

type Registry<T> = Mutex<SlotMap<ListenerId, Arc<Listener<T>>>>;

/// A multi-listener notification channel
pub struct Signal<T> {
    listeners: Arc<Registry<T>>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Register a listener; it stays registered until the returned
    /// subscription is cancelled or dropped
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener = Arc::new(Listener {
            handler: Box::new(handler),
            active: AtomicBool::new(true),
        });
        let id = lock(&self.listeners).insert(listener.clone());
        let registry = Arc::downgrade(&self.listeners);

        Subscription::new(move || {
            listener.active.store(false, Ordering::SeqCst);
            if let Some(registry) = registry.upgrade() {
                lock(&registry).remove(id);
            }
        })
    }

    /// Deliver `value` to every active listener
    pub fn emit(&self, value: &T) {
        let snapshot: SmallVec<[Arc<Listener<T>>; 4]> =
            lock(&self.listeners).values().cloned().collect();

        for listener in snapshot {
            if listener.active.load(Ordering::SeqCst) {
                (listener.handler)(value);
            }
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Unregister every listener
    pub fn clear(&self) {
        let mut listeners = lock(&self.listeners);
        for (_, listener) in listeners.drain() {
            listener.active.store(false, Ordering::SeqCst);
        }
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &lock(&self.listeners).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let signal = Signal::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));

        let t1 = total.clone();
        let _a = signal.subscribe(move |v| {
            t1.fetch_add(*v as usize, Ordering::SeqCst);
        });
        let t2 = total.clone();
        let _b = signal.subscribe(move |v| {
            t2.fetch_add(*v as usize * 10, Ordering::SeqCst);
        });

        signal.emit(&2);
        assert_eq!(total.load(Ordering::SeqCst), 22);
        assert_eq!(signal.listener_count(), 2);
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let signal = Signal::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let sub = signal.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        signal.emit(&());
        drop(sub);
        signal.emit(&());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn test_cancel_during_emission_skips_later_listener() {
        let signal = Signal::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let v = victim.clone();
        let _killer = signal.subscribe(move |_| {
            if let Some(sub) = lock(&v).take() {
                sub.cancel();
            }
        });
        let h = hits.clone();
        *lock(&victim) = Some(signal.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        // Whichever listener runs first, the victim fires at most once overall
        signal.emit(&());
        signal.emit(&());
        assert!(hits.load(Ordering::SeqCst) <= 1);
        assert_eq!(signal.listener_count(), 1);
    }

    #[test]
    fn test_reentrant_subscribe_from_handler() {
        let signal = Signal::<()>::new();
        let inner_subs: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));

        let s = signal.clone();
        let subs = inner_subs.clone();
        let _outer = signal.subscribe(move |_| {
            lock(&subs).push(s.subscribe(|_| {}));
        });

        signal.emit(&());
        assert_eq!(signal.listener_count(), 2);
    }

    #[test]
    fn test_subscription_outliving_signal() {
        let signal = Signal::<()>::new();
        let sub = signal.subscribe(|_| {});
        drop(signal);
        sub.cancel();
    }
}
