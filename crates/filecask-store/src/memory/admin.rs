//! In-memory admin attempt store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use filecask_core::result::AppResult;
use filecask_entity::admin::AdminLoginAttempt;

use crate::admin::AdminAttemptStore;

/// In-memory attempt log. Test backing only — a real deployment uses a
/// durable store so restarts cannot clear an active lockout.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttemptStore {
    /// Append-only rows.
    rows: Arc<Mutex<Vec<AdminLoginAttempt>>>,
}

impl MemoryAttemptStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, block markers included.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl AdminAttemptStore for MemoryAttemptStore {
    async fn append(&self, attempt: AdminLoginAttempt) -> AppResult<()> {
        self.rows.lock().await.push(attempt);
        Ok(())
    }

    async fn active_block(
        &self,
        ip: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<DateTime<Utc>>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|r| r.ip == ip)
            .filter_map(|r| r.blocked_until)
            .filter(|until| *until > now)
            .max())
    }

    async fn failed_count_since(&self, ip: &str, since: DateTime<Utc>) -> AppResult<u32> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|r| r.ip == ip && !r.successful && r.blocked_until.is_none() && r.at >= since)
            .count() as u32)
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|r| r.at >= cutoff || r.blocked_until.is_some_and(|until| until >= cutoff));
        Ok((before - rows.len()) as u64)
    }
}
