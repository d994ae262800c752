//! Closed denial reason set surfaced by the access-control services.
//!
//! The HTTP layer maps these to status codes and pages; they are never
//! formatted text. Reasons are deliberately coarse where a finer
//! distinction would help an attacker enumerate codes: `InvalidCode`
//! covers both nonexistent and malformed input.

use serde::{Deserialize, Serialize};

/// Why a redemption or login attempt was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DenyReason {
    /// The code is empty, malformed, or does not match any record.
    InvalidCode,
    /// The record's expiry deadline has passed.
    Expired,
    /// The record has reached its maximum download count.
    QuotaExhausted,
    /// The record was deactivated by an administrator.
    Deactivated,
    /// Too many attempts from this subject within the window.
    RateLimited {
        /// Seconds until the subject may try again.
        retry_after_seconds: i64,
    },
    /// The subject is locked out of admin login.
    LockedOut {
        /// Seconds until the lockout expires.
        retry_after_seconds: i64,
    },
    /// The supplied admin credentials did not match.
    InvalidCredentials,
}

impl DenyReason {
    /// Remaining wait in seconds for throttle/lockout denials.
    pub fn retry_after_seconds(&self) -> Option<i64> {
        match self {
            Self::RateLimited {
                retry_after_seconds,
            }
            | Self::LockedOut {
                retry_after_seconds,
            } => Some(*retry_after_seconds),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_only_on_throttle_reasons() {
        assert_eq!(
            DenyReason::RateLimited {
                retry_after_seconds: 42
            }
            .retry_after_seconds(),
            Some(42)
        );
        assert_eq!(DenyReason::InvalidCode.retry_after_seconds(), None);
        assert_eq!(DenyReason::Expired.retry_after_seconds(), None);
    }
}
