//! Admin login attempt store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use filecask_core::result::AppResult;
use filecask_entity::admin::AdminLoginAttempt;

/// Append-only store for the admin login audit log.
///
/// The admin lockout is reconstructed from this log on every check, so a
/// durable implementation makes the lockout survive process restarts.
/// The in-memory implementation exists for tests.
#[async_trait]
pub trait AdminAttemptStore: Send + Sync {
    /// Appends an attempt or block-marker row.
    async fn append(&self, attempt: AdminLoginAttempt) -> AppResult<()>;

    /// Returns the latest unexpired lockout deadline for `ip`, if any.
    async fn active_block(&self, ip: &str, now: DateTime<Utc>)
        -> AppResult<Option<DateTime<Utc>>>;

    /// Counts failed attempts from `ip` at or after `since`, excluding
    /// block-marker rows.
    async fn failed_count_since(&self, ip: &str, since: DateTime<Utc>) -> AppResult<u32>;

    /// Removes rows older than `cutoff` whose lockout (if any) has also
    /// passed. Returns how many were removed.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
