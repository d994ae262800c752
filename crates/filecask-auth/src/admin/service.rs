//! Admin authentication service — lockout gate, constant-time credential
//! check, rate-dampening delays, session issuance.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use filecask_core::clock::Clock;
use filecask_core::config::AdminConfig;
use filecask_core::result::AppResult;
use filecask_core::types::DenyReason;
use filecask_entity::admin::AdminLoginAttempt;
use filecask_store::AdminAttemptStore;

use crate::secret::SecretVerifier;
use crate::session::SessionStore;
use crate::throttle::{AttemptThrottle, DurableThrottle};

/// Result of one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched; a session was issued.
    Granted {
        /// Opaque session token.
        token: String,
    },
    /// The attempt was denied. The reason is deliberately generic on
    /// credential failure — the caller never learns how close the
    /// lockout counter is to tripping.
    Denied(DenyReason),
}

/// Orchestrates admin login: durable throttle first, then credential
/// comparison, then the audit row and the artificial delay.
pub struct AdminAuthService {
    /// Verifier holding the hashed admin secret.
    verifier: SecretVerifier,
    /// Durable lockout gate.
    throttle: DurableThrottle,
    /// Durable audit log; every attempt lands here.
    attempts: Arc<dyn AdminAttemptStore>,
    /// Live session store.
    sessions: Arc<SessionStore>,
    /// Reference clock.
    clock: Arc<dyn Clock>,
    /// Artificial per-attempt delay.
    login_delay: Duration,
}

impl std::fmt::Debug for AdminAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuthService")
            .field("login_delay", &self.login_delay)
            .finish()
    }
}

impl AdminAuthService {
    /// Creates the service from configuration and its collaborators.
    pub fn new(
        config: &AdminConfig,
        throttle: DurableThrottle,
        attempts: Arc<dyn AdminAttemptStore>,
        sessions: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        Ok(Self {
            verifier: SecretVerifier::new(&config.secret)?,
            throttle,
            attempts,
            sessions,
            clock,
            login_delay: Duration::from_secs(config.login_delay_seconds),
        })
    }

    /// Attempts an admin login from `ip`.
    ///
    /// The lockout gate runs before any credential work. On lockout the
    /// response is delayed twice as long as a normal attempt, as an
    /// extra rate dampener. On non-locked attempts the comparison is
    /// constant-time, the configured delay applies regardless of
    /// outcome, and the attempt is appended to the durable log either
    /// way. The sleeps are per-request backpressure; they never hold a
    /// lock that other subjects' requests need.
    pub async fn login(&self, password: &str, ip: &str) -> AppResult<LoginOutcome> {
        let now = self.clock.now();

        let gate = self.throttle.record(ip, now).await?;
        if !gate.allowed {
            tokio::time::sleep(self.login_delay * 2).await;
            return Ok(LoginOutcome::Denied(DenyReason::LockedOut {
                retry_after_seconds: gate.retry_after_seconds.unwrap_or(0),
            }));
        }

        let matched = self.verifier.verify(password)?;

        self.attempts
            .append(AdminLoginAttempt::new(ip, now, matched))
            .await?;
        tokio::time::sleep(self.login_delay).await;

        if matched {
            let token = self.sessions.issue(self.clock.now());
            info!(ip = %ip, "Admin login succeeded");
            Ok(LoginOutcome::Granted { token })
        } else {
            warn!(ip = %ip, "Admin login failed");
            Ok(LoginOutcome::Denied(DenyReason::InvalidCredentials))
        }
    }
}
