//! Admin session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-held admin session state, keyed by an opaque token.
///
/// Sessions live only in process memory; a restart logs every admin out,
/// which is acceptable because re-login is cheap and the lockout state
/// that matters for security is durable elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
    /// Last privileged activity. Refreshed on every allowed request.
    pub last_activity: DateTime<Utc>,
}

impl AdminSession {
    /// Creates a fresh session at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            last_activity: now,
        }
    }

    /// Seconds since the last privileged activity.
    pub fn idle_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_activity).num_seconds()
    }
}
