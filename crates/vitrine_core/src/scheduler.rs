//! Cooperative timer scheduler
//!
//! Owns every delayed and periodic callback of the runtime. Time is virtual:
//! the host advances it with [`Scheduler::advance_to`] (a live host passes
//! `Instant::now()`, tests pass synthetic instants) and due timers fire in
//! deadline order inside that call. Nothing blocks; a delay is a future
//! callback, not a wait.
//!
//! Callbacks run with no scheduler lock held, so they may schedule or cancel
//! timers. While a callback runs, [`Scheduler::now`] reports the deadline it
//! was scheduled for.

use crate::subscription::Subscription;
use crate::sync::lock;
use slotmap::{new_key_type, SlotMap};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

new_key_type! {
    /// Identifier of a scheduled timer or interval
    pub struct TimerId;
}

/// Shortest accepted interval period; keeps catch-up loops finite
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

type Callback = Box<dyn FnMut() + Send>;

struct Timer {
    deadline: Instant,
    period: Option<Duration>,
    /// Tie-breaker so equal deadlines fire in scheduling order
    seq: u64,
    /// Taken out while the callback is running
    callback: Option<Callback>,
}

struct SchedulerState {
    timers: SlotMap<TimerId, Timer>,
    now: Instant,
    next_seq: u64,
}

/// Shared handle to a timer queue
#[derive(Clone)]
pub struct Scheduler {
    state: Arc<Mutex<SchedulerState>>,
}

impl Scheduler {
    /// Create a scheduler whose clock starts at the current instant
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a scheduler whose clock starts at `now`
    pub fn starting_at(now: Instant) -> Self {
        Self {
            state: Arc::new(Mutex::new(SchedulerState {
                timers: SlotMap::with_key(),
                now,
                next_seq: 0,
            })),
        }
    }

    /// Current scheduler time
    pub fn now(&self) -> Instant {
        lock(&self.state).now
    }

    /// Run `callback` once, `delay` from now
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        let mut once = Some(callback);
        self.insert(delay, None, move || {
            if let Some(callback) = once.take() {
                callback();
            }
        })
    }

    /// Run `callback` every `period`, first `period` from now
    pub fn set_interval<F>(&self, period: Duration, callback: F) -> TimerId
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        self.insert(period, Some(period), callback)
    }

    /// [`set_timeout`](Self::set_timeout) returning a cancelling handle
    pub fn timeout<F>(&self, delay: Duration, callback: F) -> Subscription
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.set_timeout(delay, callback);
        self.subscription_for(id)
    }

    /// [`set_interval`](Self::set_interval) returning a cancelling handle
    pub fn interval<F>(&self, period: Duration, callback: F) -> Subscription
    where
        F: FnMut() + Send + 'static,
    {
        let id = self.set_interval(period, callback);
        self.subscription_for(id)
    }

    /// Wrap an existing timer id in a cancelling handle
    pub fn subscription_for(&self, id: TimerId) -> Subscription {
        let state = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                lock(&state).timers.remove(id);
            }
        })
    }

    fn insert<F>(&self, delay: Duration, period: Option<Duration>, callback: F) -> TimerId
    where
        F: FnMut() + Send + 'static,
    {
        let mut state = lock(&self.state);
        let seq = state.next_seq;
        state.next_seq += 1;
        let deadline = state.now + delay;
        state.timers.insert(Timer {
            deadline,
            period,
            seq,
            callback: Some(Box::new(callback)),
        })
    }

    /// Cancel a timer; returns false if it already fired or was cancelled
    pub fn cancel(&self, id: TimerId) -> bool {
        lock(&self.state).timers.remove(id).is_some()
    }

    /// Whether the timer is still pending
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        lock(&self.state).timers.contains_key(id)
    }

    /// Number of pending timers and intervals
    pub fn pending(&self) -> usize {
        lock(&self.state).timers.len()
    }

    /// Earliest pending deadline, for hosts that sleep between events
    pub fn next_deadline(&self) -> Option<Instant> {
        lock(&self.state)
            .timers
            .values()
            .map(|timer| timer.deadline)
            .min()
    }

    /// Drop every pending timer without running it
    pub fn clear(&self) {
        lock(&self.state).timers.clear();
    }

    /// Advance the clock by `delta`, firing everything that becomes due
    pub fn advance_by(&self, delta: Duration) -> usize {
        let target = self.now() + delta;
        self.advance_to(target)
    }

    /// Advance the clock to `target`, firing due timers in deadline order.
    ///
    /// Intervals that fall behind catch up one period at a time. Returns the
    /// number of callbacks run. The clock never moves backwards.
    pub fn advance_to(&self, target: Instant) -> usize {
        let mut fired = 0;

        loop {
            let (id, mut callback, periodic) = {
                let mut state = lock(&self.state);
                let due = state
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.deadline <= target && timer.callback.is_some())
                    .min_by_key(|(_, timer)| (timer.deadline, timer.seq))
                    .map(|(id, _)| id);

                let Some(id) = due else {
                    if target > state.now {
                        state.now = target;
                    }
                    break;
                };

                let seq = state.next_seq;
                state.next_seq += 1;

                let timer = &mut state.timers[id];
                let deadline = timer.deadline;
                let callback = timer.callback.take();
                let periodic = match timer.period {
                    Some(period) => {
                        timer.deadline = deadline + period;
                        timer.seq = seq;
                        true
                    }
                    None => false,
                };

                if !periodic {
                    state.timers.remove(id);
                }
                if deadline > state.now {
                    state.now = deadline;
                }
                (id, callback, periodic)
            };

            if let Some(callback) = callback.as_mut() {
                callback();
                fired += 1;
            }

            // Hand the callback back unless the interval was cancelled meanwhile
            if periodic {
                let mut state = lock(&self.state);
                if let Some(timer) = state.timers.get_mut(id) {
                    if timer.callback.is_none() {
                        timer.callback = callback;
                    }
                }
            }
        }

        if fired > 0 {
            tracing::trace!("scheduler fired {} callback(s)", fired);
        }
        fired
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("Scheduler")
            .field("now", &state.now)
            .field("pending", &state.timers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_timeout_fires_at_deadline() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        scheduler.set_timeout(ms(300), move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(scheduler.advance_by(ms(299)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.advance_by(ms(1)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let scheduler = Scheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (delay, tag) in [(30, 'c'), (10, 'a'), (20, 'b'), (10, 'x')] {
            let order = order.clone();
            scheduler.set_timeout(ms(delay), move || lock(&order).push(tag));
        }

        scheduler.advance_by(ms(100));
        assert_eq!(*lock(&order), vec!['a', 'x', 'b', 'c']);
    }

    #[test]
    fn test_cancel() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let id = scheduler.set_timeout(ms(10), move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert!(scheduler.is_scheduled(id));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        scheduler.advance_by(ms(50));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_interval_catches_up() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let sub = scheduler.interval(ms(100), move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(scheduler.advance_by(ms(350)), 3);
        assert_eq!(scheduler.advance_by(ms(50)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 4);

        drop(sub);
        scheduler.advance_by(ms(1000));
        assert_eq!(hits.load(Ordering::SeqCst), 4);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_now_during_callback_is_deadline() {
        let start = Instant::now();
        let scheduler = Scheduler::starting_at(start);
        let seen = Arc::new(Mutex::new(None));

        let s = scheduler.clone();
        let seen_clone = seen.clone();
        scheduler.set_timeout(ms(40), move || {
            *lock(&seen_clone) = Some(s.now());
        });

        scheduler.advance_by(ms(500));
        assert_eq!(*lock(&seen), Some(start + ms(40)));
        assert_eq!(scheduler.now(), start + ms(500));
    }

    #[test]
    fn test_callback_can_reschedule() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let s = scheduler.clone();
        let h = hits.clone();
        scheduler.set_timeout(ms(10), move || {
            h.fetch_add(1, Ordering::SeqCst);
            let h = h.clone();
            s.set_timeout(ms(10), move || {
                h.fetch_add(1, Ordering::SeqCst);
            });
        });

        // Both the original and the follow-up fall inside the window
        assert_eq!(scheduler.advance_by(ms(25)), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_interval_cancelled_from_own_callback() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let own_id: Arc<Mutex<Option<TimerId>>> = Arc::new(Mutex::new(None));

        let s = scheduler.clone();
        let h = hits.clone();
        let id_slot = own_id.clone();
        let id = scheduler.set_interval(ms(10), move || {
            h.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *lock(&id_slot) {
                s.cancel(id);
            }
        });
        *lock(&own_id) = Some(id);

        scheduler.advance_by(ms(100));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_scheduled(id));
    }

    #[test]
    fn test_next_deadline() {
        let start = Instant::now();
        let scheduler = Scheduler::starting_at(start);
        assert_eq!(scheduler.next_deadline(), None);

        let _a = scheduler.timeout(ms(80), || {});
        let _b = scheduler.timeout(ms(20), || {});
        assert_eq!(scheduler.next_deadline(), Some(start + ms(20)));
    }
}
