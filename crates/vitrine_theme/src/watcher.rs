//! OS color scheme watcher
//!
//! Hosts without push notifications for appearance changes can poll instead:
//! [`SchemeWatcher`] samples [`CapabilityProvider::prefers_dark`] on a
//! scheduler interval and emits on the OS dark-mode signal only when the
//! value flips.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vitrine_core::{CapabilityProvider, Scheduler, Signal, Subscription};

struct WatchState {
    caps: Arc<dyn CapabilityProvider>,
    signal: Signal<bool>,
    last: AtomicBool,
}

impl WatchState {
    fn poll(&self) -> bool {
        let dark = self.caps.prefers_dark();
        let previous = self.last.swap(dark, Ordering::SeqCst);
        if previous != dark {
            tracing::debug!(dark, "SchemeWatcher - OS color scheme changed");
            self.signal.emit(&dark);
            true
        } else {
            false
        }
    }
}

/// Polls the OS color scheme and feeds the dark-mode signal
pub struct SchemeWatcher {
    state: Arc<WatchState>,
    timer: Subscription,
}

impl SchemeWatcher {
    /// Start polling every `period`; the current value is the baseline and
    /// is not emitted
    pub fn start(
        scheduler: &Scheduler,
        caps: Arc<dyn CapabilityProvider>,
        signal: Signal<bool>,
        period: Duration,
    ) -> Self {
        let state = Arc::new(WatchState {
            last: AtomicBool::new(caps.prefers_dark()),
            caps,
            signal,
        });

        let polled = state.clone();
        let timer = scheduler.interval(period, move || {
            polled.poll();
        });

        Self { state, timer }
    }

    /// Sample immediately; returns whether a change was emitted
    pub fn poll_now(&self) -> bool {
        self.state.poll()
    }

    /// Last observed OS preference
    pub fn prefers_dark(&self) -> bool {
        self.state.last.load(Ordering::SeqCst)
    }

    pub fn stop(self) {
        self.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use vitrine_core::sync::lock;

    #[derive(Default)]
    struct ToggleCaps {
        dark: AtomicBool,
    }

    impl CapabilityProvider for ToggleCaps {
        fn is_mobile(&self) -> bool {
            false
        }
        fn device_memory(&self) -> Option<f32> {
            None
        }
        fn core_count(&self) -> Option<u32> {
            None
        }
        fn prefers_dark(&self) -> bool {
            self.dark.load(Ordering::SeqCst)
        }
        fn prefers_reduced_motion(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_emits_only_on_change() {
        let scheduler = Scheduler::new();
        let caps = Arc::new(ToggleCaps::default());
        let signal = Signal::<bool>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _sub = signal.subscribe(move |dark| lock(&s).push(*dark));

        let watcher = SchemeWatcher::start(
            &scheduler,
            caps.clone(),
            signal.clone(),
            Duration::from_secs(2),
        );

        scheduler.advance_by(Duration::from_secs(6));
        assert!(lock(&seen).is_empty());

        caps.dark.store(true, Ordering::SeqCst);
        scheduler.advance_by(Duration::from_secs(2));
        scheduler.advance_by(Duration::from_secs(4));
        assert_eq!(*lock(&seen), vec![true]);
        assert!(watcher.prefers_dark());

        caps.dark.store(false, Ordering::SeqCst);
        assert!(watcher.poll_now());
        assert!(!watcher.poll_now());
        assert_eq!(*lock(&seen), vec![true, false]);

        watcher.stop();
        assert_eq!(scheduler.pending(), 0);
    }
}
