//! Expiry sweep configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic expired-record sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Interval between sweep cycles in minutes.
    #[serde(default = "default_interval")]
    pub interval_minutes: u64,
    /// Retention in days for download events and admin login attempts.
    #[serde(default = "default_retention")]
    pub log_retention_days: i64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval(),
            log_retention_days: default_retention(),
        }
    }
}

fn default_interval() -> u64 {
    15
}

fn default_retention() -> i64 {
    30
}
