//! Trailing-edge debouncing
//!
//! [`Debounced`] wraps a rapidly changing live value and exposes a copy that
//! only moves once the live value has been stable for `delay`. There is at
//! most one pending timer: every [`update`](Debounced::update) cancels it and
//! arms a new one, even when the new value equals the old one (values are
//! never compared). Wrap large records in `Arc` to keep clones cheap.
//!
//! ```rust
//! use std::time::Duration;
//! use vitrine_core::{Debounced, Scheduler};
//!
//! let scheduler = Scheduler::new();
//! let query = Debounced::new(&scheduler, String::new(), Duration::from_millis(300));
//!
//! query.update("c".to_string());
//! query.update("ca".to_string());
//! query.update("cat".to_string());
//! assert_eq!(query.get(), "");
//!
//! scheduler.advance_by(Duration::from_millis(300));
//! assert_eq!(query.get(), "cat");
//! ```

use crate::scheduler::{Scheduler, TimerId};
use crate::signal::Signal;
use crate::subscription::Subscription;
use crate::sync::lock;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

struct DebounceState<T> {
    current: T,
    pending: Option<T>,
    timer: Option<TimerId>,
    delay: Duration,
    disposed: bool,
}

struct Shared<T> {
    state: Mutex<DebounceState<T>>,
    emitted: Signal<T>,
}

impl<T: Clone + Send + 'static> Shared<T> {
    /// Promote the pending value; runs when the timer fires or on flush
    fn settle(&self) {
        let value = {
            let mut state = lock(&self.state);
            if state.disposed {
                return;
            }
            state.timer = None;
            let Some(value) = state.pending.take() else {
                return;
            };
            state.current = value.clone();
            value
        };
        self.emitted.emit(&value);
    }
}

/// A delay-stabilized copy of a live value
pub struct Debounced<T: Clone + Send + 'static> {
    shared: Arc<Shared<T>>,
    scheduler: Scheduler,
}

impl<T: Clone + Send + 'static> Debounced<T> {
    /// Start with `initial` as the settled value; nothing is emitted for it
    pub fn new(scheduler: &Scheduler, initial: T, delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(DebounceState {
                    current: initial,
                    pending: None,
                    timer: None,
                    delay,
                    disposed: false,
                }),
                emitted: Signal::new(),
            }),
            scheduler: scheduler.clone(),
        }
    }

    /// Feed a new live value, restarting the delay
    pub fn update(&self, value: T) {
        let (previous, delay) = {
            let mut state = lock(&self.shared.state);
            if state.disposed {
                return;
            }
            state.pending = Some(value);
            (state.timer.take(), state.delay)
        };
        self.arm(previous, delay);
    }

    /// Change the delay; a pending emission is re-armed with the new delay
    pub fn set_delay(&self, delay: Duration) {
        let previous = {
            let mut state = lock(&self.shared.state);
            if state.disposed {
                return;
            }
            state.delay = delay;
            if state.pending.is_none() {
                return;
            }
            state.timer.take()
        };
        self.arm(previous, delay);
    }

    fn arm(&self, previous: Option<TimerId>, delay: Duration) {
        if let Some(previous) = previous {
            self.scheduler.cancel(previous);
        }

        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        let id = self.scheduler.set_timeout(delay, move || {
            if let Some(shared) = weak.upgrade() {
                shared.settle();
            }
        });

        let mut state = lock(&self.shared.state);
        if state.disposed {
            drop(state);
            self.scheduler.cancel(id);
        } else {
            state.timer = Some(id);
        }
    }

    /// The settled value
    pub fn get(&self) -> T {
        lock(&self.shared.state).current.clone()
    }

    /// Whether an emission is scheduled
    pub fn is_pending(&self) -> bool {
        lock(&self.shared.state).pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        lock(&self.shared.state).delay
    }

    /// Emit the pending value now instead of waiting out the delay
    pub fn flush(&self) {
        let timer = lock(&self.shared.state).timer.take();
        if let Some(timer) = timer {
            self.scheduler.cancel(timer);
        }
        self.shared.settle();
    }

    /// Observe settled values
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.shared.emitted.subscribe(listener)
    }

    /// Cancel the pending timer and stop emitting
    pub fn dispose(&self) {
        let timer = {
            let mut state = lock(&self.shared.state);
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.pending = None;
            state.timer.take()
        };
        if let Some(timer) = timer {
            self.scheduler.cancel(timer);
        }
        self.shared.emitted.clear();
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.shared.state).disposed
    }
}

impl<T: Clone + Send + 'static> Drop for Debounced<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Clone + Send + fmt::Debug + 'static> fmt::Debug for Debounced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.shared.state);
        f.debug_struct("Debounced")
            .field("current", &state.current)
            .field("pending", &state.pending)
            .field("delay", &state.delay)
            .finish()
    }
}
