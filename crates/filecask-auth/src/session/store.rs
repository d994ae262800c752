//! In-process admin session store.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use tracing::info;

use filecask_entity::admin::AdminSession;

/// Holds live admin sessions keyed by opaque token.
///
/// Sessions are process-lifetime only; a restart logs every admin out.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// Live sessions by token.
    sessions: DashMap<String, AdminSession>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh session and returns its token.
    pub fn issue(&self, now: DateTime<Utc>) -> String {
        let token = generate_token();
        self.sessions.insert(token.clone(), AdminSession::new(now));
        info!("Admin session issued");
        token
    }

    /// Looks up a session by token.
    pub fn get(&self, token: &str) -> Option<AdminSession> {
        self.sessions.get(token).map(|s| s.clone())
    }

    /// Sets `last_activity` for a live session. Returns `false` if the
    /// token is unknown.
    pub fn touch(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.sessions.get_mut(token) {
            Some(mut session) => {
                session.last_activity = now;
                true
            }
            None => false,
        }
    }

    /// Removes a session. Returns `true` if one existed.
    pub fn remove(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Generates a cryptographically secure opaque session token.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
