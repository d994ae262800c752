//! Sliding-expiration guard for privileged operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use filecask_core::clock::Clock;

use super::store::SessionStore;

/// Why the guard denied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionDenied {
    /// No session token, or the token matches no live session.
    MissingSession,
    /// The session sat idle past the timeout and was invalidated.
    Expired,
}

/// Outcome of guarding one privileged request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The request may proceed; the session was refreshed.
    Continue,
    /// The request must be redirected to login.
    Denied(SessionDenied),
}

/// Validates and refreshes the admin session on every privileged
/// request, enforcing the idle timeout.
///
/// Staleness is judged against the pre-refresh `last_activity`; the new
/// timestamp is written only on the allow path, so the refresh can never
/// race the timeout check into keeping a dead session alive.
pub struct SessionGuard {
    /// Live session store.
    sessions: Arc<SessionStore>,
    /// Idle timeout in seconds.
    timeout_seconds: i64,
    /// Reference clock.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl SessionGuard {
    /// Creates a guard with the given idle timeout.
    pub fn new(sessions: Arc<SessionStore>, timeout_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            timeout_seconds,
            clock,
        }
    }

    /// Authorizes one privileged request carrying `token`.
    ///
    /// `None` (no cookie/header at all) and an unknown token both deny
    /// with [`SessionDenied::MissingSession`].
    pub fn authorize(&self, token: Option<&str>) -> GuardOutcome {
        let Some(token) = token else {
            return GuardOutcome::Denied(SessionDenied::MissingSession);
        };

        let Some(session) = self.sessions.get(token) else {
            return GuardOutcome::Denied(SessionDenied::MissingSession);
        };

        let now = self.clock.now();
        if session.idle_seconds(now) > self.timeout_seconds {
            self.sessions.remove(token);
            info!("Admin session expired after idle timeout");
            return GuardOutcome::Denied(SessionDenied::Expired);
        }

        self.sessions.touch(token, now);
        GuardOutcome::Continue
    }

    /// Destroys the session for an explicit logout.
    pub fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.remove(token);
        if removed {
            info!("Admin session logged out");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filecask_core::clock::ManualClock;

    fn guard_with_clock() -> (SessionGuard, Arc<SessionStore>, Arc<ManualClock>) {
        let sessions = Arc::new(SessionStore::new());
        let clock = Arc::new(ManualClock::now_frozen());
        let guard = SessionGuard::new(
            Arc::clone(&sessions),
            1800,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        (guard, sessions, clock)
    }

    #[test]
    fn missing_and_unknown_tokens_deny() {
        let (guard, _, _) = guard_with_clock();
        assert_eq!(
            guard.authorize(None),
            GuardOutcome::Denied(SessionDenied::MissingSession)
        );
        assert_eq!(
            guard.authorize(Some("deadbeef")),
            GuardOutcome::Denied(SessionDenied::MissingSession)
        );
    }

    #[test]
    fn idle_session_is_expired_and_removed() {
        let (guard, sessions, clock) = guard_with_clock();
        let token = sessions.issue(clock.now());

        clock.advance_seconds(1801);
        assert_eq!(
            guard.authorize(Some(&token)),
            GuardOutcome::Denied(SessionDenied::Expired)
        );
        // The session is gone entirely, not merely denied.
        assert!(sessions.get(&token).is_none());
    }

    #[test]
    fn activity_keeps_the_session_alive_indefinitely() {
        let (guard, sessions, clock) = guard_with_clock();
        let token = sessions.issue(clock.now());

        for _ in 0..10 {
            clock.advance_seconds(900);
            assert_eq!(guard.authorize(Some(&token)), GuardOutcome::Continue);
        }
    }

    #[test]
    fn boundary_is_strictly_greater_than_timeout() {
        let (guard, sessions, clock) = guard_with_clock();
        let token = sessions.issue(clock.now());

        clock.advance_seconds(1800);
        assert_eq!(guard.authorize(Some(&token)), GuardOutcome::Continue);
    }

    #[test]
    fn logout_destroys_the_session() {
        let (guard, sessions, clock) = guard_with_clock();
        let token = sessions.issue(clock.now());

        assert!(guard.logout(&token));
        assert_eq!(
            guard.authorize(Some(&token)),
            GuardOutcome::Denied(SessionDenied::MissingSession)
        );
    }
}
