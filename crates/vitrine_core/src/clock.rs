//! Wall-clock access
//!
//! Only the local hour of day matters to the runtime (time-of-day theming);
//! monotonic time lives in the [`Scheduler`](crate::scheduler::Scheduler).

use chrono::Timelike;
use std::sync::atomic::{AtomicU32, Ordering};

/// Source of the local hour of day
pub trait Clock: Send + Sync {
    /// Local hour, `0..=23`
    fn local_hour(&self) -> u32;
}

/// The host's local time zone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// A settable clock for tests and simulations
#[derive(Debug)]
pub struct FixedClock {
    hour: AtomicU32,
}

impl FixedClock {
    pub fn new(hour: u32) -> Self {
        Self {
            hour: AtomicU32::new(hour % 24),
        }
    }

    pub fn set_hour(&self, hour: u32) {
        self.hour.store(hour % 24, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn local_hour(&self) -> u32 {
        self.hour.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_wraps() {
        let clock = FixedClock::new(25);
        assert_eq!(clock.local_hour(), 1);
        clock.set_hour(18);
        assert_eq!(clock.local_hour(), 18);
    }

    #[test]
    fn test_system_clock_in_range() {
        assert!(SystemClock.local_hour() < 24);
    }
}
