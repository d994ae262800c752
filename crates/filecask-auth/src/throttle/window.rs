//! Per-subject sliding window state.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use filecask_core::config::throttle::WindowConfig;

use super::Decision;

/// Attempt timestamps and lockout state for one subject.
///
/// The sequence is monotonically trimmed: entries leave from the front
/// as they age out of the window, new attempts append at the back.
#[derive(Debug, Default)]
pub struct WindowState {
    /// Attempt timestamps within the current window, oldest first.
    attempts: VecDeque<DateTime<Utc>>,
    /// Hard block deadline, if the threshold tripped.
    blocked_until: Option<DateTime<Utc>>,
}

impl WindowState {
    /// Creates empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attempt at `now` under `config`.
    ///
    /// The attempt is appended before the threshold is evaluated, so the
    /// call that trips the limit is itself counted.
    pub fn record(&mut self, now: DateTime<Utc>, config: &WindowConfig) -> Decision {
        if let Some(blocked_until) = self.blocked_until {
            if now < blocked_until {
                return Decision::blocked((blocked_until - now).num_seconds());
            }
            self.blocked_until = None;
        }

        self.attempts.push_back(now);

        let horizon = now - Duration::seconds(config.window_seconds);
        while let Some(front) = self.attempts.front() {
            if *front < horizon {
                self.attempts.pop_front();
            } else {
                break;
            }
        }

        if self.attempts.len() as u32 > config.max_attempts {
            self.blocked_until = Some(now + Duration::seconds(config.block_seconds));
            // The block supersedes the window; start fresh when it lifts.
            self.attempts.clear();
            return Decision::blocked(config.block_seconds);
        }

        Decision::allowed()
    }

    /// Whether the subject is currently blocked.
    pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.blocked_until, Some(until) if now < until)
    }
}
