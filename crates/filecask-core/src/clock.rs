//! Reference clock abstraction.
//!
//! Every timestamp in the system is created, compared, and stored in UTC
//! through a [`Clock`] implementation. Mixing naive and zone-aware times
//! was a recurring bug class in ad hoc sharing services; normalizing at
//! this boundary removes it entirely.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time, injected into every time-dependent component.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    /// Current frozen instant.
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a manual clock frozen at the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Creates a manual clock frozen at the current system time.
    pub fn now_frozen() -> Self {
        Self::new(Utc::now())
    }

    /// Advances the clock by the given number of seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += Duration::seconds(seconds);
    }

    /// Sets the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::now_frozen();
        let start = clock.now();
        clock.advance_seconds(300);
        assert_eq!(clock.now() - start, Duration::seconds(300));
    }

    #[test]
    fn manual_clock_is_frozen_between_advances() {
        let clock = ManualClock::now_frozen();
        assert_eq!(clock.now(), clock.now());
    }
}
