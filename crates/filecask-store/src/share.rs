//! Share record and download log store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use filecask_core::result::AppResult;
use filecask_core::types::{PageRequest, PageResponse, ShareId};
use filecask_entity::download::DownloadEvent;
use filecask_entity::share::{ShareRecord, Validity};

/// Result of an atomic redemption commit.
///
/// The commit re-validates the record under the store's write lock, so a
/// record that expired or exhausted its quota between authorization and
/// transfer is rejected here rather than over-counted.
#[derive(Debug, Clone)]
pub enum RedeemCommit {
    /// The counter was incremented and the event appended as one unit.
    Committed(ShareRecord),
    /// The record failed re-validation; nothing was written.
    Rejected(Validity),
    /// The record disappeared between lookup and commit.
    NotFound,
}

/// Persistence boundary for share records.
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Creates a record. Fails with a `Conflict` error if the code is
    /// already taken — code uniqueness is an invariant, never repaired
    /// silently.
    async fn create(&self, record: ShareRecord) -> AppResult<ShareRecord>;

    /// Looks up a record by its extraction code (case-sensitive).
    async fn find_by_code(&self, code: &str) -> AppResult<Option<ShareRecord>>;

    /// Looks up a record by ID.
    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<ShareRecord>>;

    /// Updates a record, checking its `version` for concurrent
    /// modification. Returns the stored record with the bumped version.
    async fn update(&self, record: ShareRecord) -> AppResult<ShareRecord>;

    /// Deletes a record and cascades its download events.
    /// Returns `true` if a record was deleted.
    async fn delete(&self, id: ShareId) -> AppResult<bool>;

    /// Deletes a record only if its expiry deadline has passed at `now`.
    ///
    /// The sweep uses this so it never removes a record that was renewed
    /// between query and delete.
    async fn delete_if_expired(&self, id: ShareId, now: DateTime<Utc>) -> AppResult<bool>;

    /// Lists records ordered by creation time, newest first.
    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<ShareRecord>>;

    /// Returns records whose expiry deadline has passed at `now`.
    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<ShareRecord>>;

    /// Atomically re-validates the record at `now`, increments its
    /// download counter, and appends `event` — a single unit, so a crash
    /// or a concurrent redemption can never leave the counter out of
    /// sync with the audit log or push it past the cap.
    async fn commit_redemption(
        &self,
        id: ShareId,
        event: DownloadEvent,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemCommit>;

    /// Total number of records.
    async fn count(&self) -> AppResult<u64>;
}

/// Read/prune access to the download event log.
#[async_trait]
pub trait DownloadLogStore: Send + Sync {
    /// Returns events from `ip` at or after `since`, oldest first.
    /// When `share_id` is given, only events for that record count.
    async fn recent_downloads(
        &self,
        ip: &str,
        share_id: Option<ShareId>,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<DownloadEvent>>;

    /// Returns all events for a record, oldest first.
    async fn events_for(&self, share_id: ShareId) -> AppResult<Vec<DownloadEvent>>;

    /// Removes events older than `cutoff`. Returns how many were removed.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
