//! Administrator authentication configuration.

use serde::{Deserialize, Serialize};

/// Admin credential, delay, and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The admin secret. Must be overridden in any real deployment.
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Artificial delay in seconds applied to every login attempt.
    #[serde(default = "default_login_delay")]
    pub login_delay_seconds: u64,
    /// Idle timeout in seconds before an admin session hard-expires.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_seconds: i64,
    /// Path of the durable login attempt log.
    #[serde(default = "default_attempt_log_path")]
    pub attempt_log_path: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            login_delay_seconds: default_login_delay(),
            session_timeout_seconds: default_session_timeout(),
            attempt_log_path: default_attempt_log_path(),
        }
    }
}

fn default_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_login_delay() -> u64 {
    2
}

fn default_session_timeout() -> i64 {
    300
}

fn default_attempt_log_path() -> String {
    "data/admin_attempts.jsonl".to_string()
}
