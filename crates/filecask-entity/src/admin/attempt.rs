//! Admin login attempt log entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filecask_core::types::AttemptId;

/// One row of the durable admin-login audit log.
///
/// Regular rows record an attempt and its outcome. Block-marker rows
/// (with `blocked_until` set) record that the lockout threshold tripped;
/// the throttle consults them so a process restart cannot clear an
/// active lockout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginAttempt {
    /// Unique entry identifier.
    pub id: AttemptId,
    /// Source IP of the attempt.
    pub ip: String,
    /// When the attempt happened.
    pub at: DateTime<Utc>,
    /// Whether the credentials matched.
    pub successful: bool,
    /// Lockout deadline, set only on block-marker rows.
    pub blocked_until: Option<DateTime<Utc>>,
}

impl AdminLoginAttempt {
    /// Creates a regular attempt row.
    pub fn new(ip: impl Into<String>, at: DateTime<Utc>, successful: bool) -> Self {
        Self {
            id: AttemptId::new(),
            ip: ip.into(),
            at,
            successful,
            blocked_until: None,
        }
    }

    /// Creates a block-marker row with the given lockout deadline.
    pub fn block_marker(
        ip: impl Into<String>,
        at: DateTime<Utc>,
        blocked_until: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AttemptId::new(),
            ip: ip.into(),
            at,
            successful: false,
            blocked_until: Some(blocked_until),
        }
    }
}
