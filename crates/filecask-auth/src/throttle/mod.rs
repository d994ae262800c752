//! Sliding window + lockout attempt throttling.

pub mod durable;
pub mod memory;
pub mod window;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filecask_core::result::AppResult;

pub use durable::DurableThrottle;
pub use memory::MemoryThrottle;

/// Verdict for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the attempt may proceed.
    pub allowed: bool,
    /// Seconds until the subject may try again, set when not allowed.
    pub retry_after_seconds: Option<i64>,
}

impl Decision {
    /// An allowed attempt.
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_seconds: None,
        }
    }

    /// A blocked attempt with the remaining wait.
    pub fn blocked(retry_after_seconds: i64) -> Self {
        Self {
            allowed: false,
            retry_after_seconds: Some(retry_after_seconds.max(0)),
        }
    }
}

/// Generic attempt throttle, parameterized per subject key.
///
/// Implementations serialize concurrent updates for the same subject,
/// and the window always counts the triggering attempt itself —
/// otherwise an attacker can sit exactly at the limit forever.
#[async_trait]
pub trait AttemptThrottle: Send + Sync {
    /// Records an attempt by `subject` at `now` and decides whether it
    /// may proceed.
    async fn record(&self, subject: &str, now: DateTime<Utc>) -> AppResult<Decision>;
}
