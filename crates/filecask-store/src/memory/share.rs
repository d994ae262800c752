//! In-memory share record store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use filecask_core::error::AppError;
use filecask_core::result::AppResult;
use filecask_core::types::{PageRequest, PageResponse, ShareId};
use filecask_entity::download::DownloadEvent;
use filecask_entity::share::{ShareRecord, Validity};

use crate::share::{DownloadLogStore, RedeemCommit, ShareStore};

/// Internal state for the memory share store.
///
/// Records and their events share one lock: the redemption commit must
/// observe and mutate both as a single unit.
#[derive(Debug, Default)]
struct Inner {
    /// Records by ID.
    shares: HashMap<ShareId, ShareRecord>,
    /// Code -> ID index enforcing the uniqueness invariant.
    by_code: HashMap<String, ShareId>,
    /// Append-only download event log.
    events: Vec<DownloadEvent>,
}

/// In-memory share store using a Tokio mutex for thread safety.
///
/// Suitable for single-node deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemoryShareStore {
    /// Protected inner state.
    inner: Arc<Mutex<Inner>>,
}

impl MemoryShareStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn create(&self, record: ShareRecord) -> AppResult<ShareRecord> {
        let mut inner = self.inner.lock().await;

        if inner.by_code.contains_key(&record.code) {
            return Err(AppError::conflict(format!(
                "extraction code already allocated: {}",
                record.code
            )));
        }

        inner.by_code.insert(record.code.clone(), record.id);
        inner.shares.insert(record.id, record.clone());
        debug!(share_id = %record.id, "Share record created");
        Ok(record)
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<ShareRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .by_code
            .get(code)
            .and_then(|id| inner.shares.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<ShareRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.shares.get(&id).cloned())
    }

    async fn update(&self, mut record: ShareRecord) -> AppResult<ShareRecord> {
        let mut inner = self.inner.lock().await;

        let current = inner
            .shares
            .get(&record.id)
            .ok_or_else(|| AppError::not_found(format!("share record not found: {}", record.id)))?;

        if current.version != record.version {
            return Err(AppError::conflict(format!(
                "share record modified concurrently: {} (expected version {}, found {})",
                record.id, record.version, current.version
            )));
        }

        record.version += 1;
        inner.shares.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: ShareId) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;

        let Some(record) = inner.shares.remove(&id) else {
            return Ok(false);
        };
        inner.by_code.remove(&record.code);
        inner.events.retain(|e| e.share_id != id);
        debug!(share_id = %id, "Share record deleted with its events");
        Ok(true)
    }

    async fn delete_if_expired(&self, id: ShareId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;

        let Some(record) = inner.shares.get(&id) else {
            return Ok(false);
        };
        if !record.is_past_expiry(now) {
            // Renewed between query and delete; leave it alone.
            return Ok(false);
        }

        let record = inner.shares.remove(&id).expect("checked above");
        inner.by_code.remove(&record.code);
        inner.events.retain(|e| e.share_id != id);
        Ok(true)
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<ShareRecord>> {
        let inner = self.inner.lock().await;

        let mut records: Vec<ShareRecord> = inner.shares.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = records.len() as u64;
        let items = records
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<ShareRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .shares
            .values()
            .filter(|r| r.is_past_expiry(now))
            .cloned()
            .collect())
    }

    async fn commit_redemption(
        &self,
        id: ShareId,
        event: DownloadEvent,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemCommit> {
        let mut inner = self.inner.lock().await;

        let Some(record) = inner.shares.get_mut(&id) else {
            return Ok(RedeemCommit::NotFound);
        };

        // Re-validate under the lock; the authorization check outside it
        // may be stale by now.
        match record.validity(now) {
            Validity::Valid => {}
            other => {
                warn!(share_id = %id, validity = ?other, "Redemption rejected at commit");
                return Ok(RedeemCommit::Rejected(other));
            }
        }

        record.download_count += 1;
        record.version += 1;
        let committed = record.clone();
        inner.events.push(event);

        Ok(RedeemCommit::Committed(committed))
    }

    async fn count(&self) -> AppResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.shares.len() as u64)
    }
}

#[async_trait]
impl DownloadLogStore for MemoryShareStore {
    async fn recent_downloads(
        &self,
        ip: &str,
        share_id: Option<ShareId>,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<DownloadEvent>> {
        let inner = self.inner.lock().await;
        let mut events: Vec<DownloadEvent> = inner
            .events
            .iter()
            .filter(|e| e.ip == ip && e.at >= since)
            .filter(|e| share_id.is_none_or(|id| e.share_id == id))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.at);
        Ok(events)
    }

    async fn events_for(&self, share_id: ShareId) -> AppResult<Vec<DownloadEvent>> {
        let inner = self.inner.lock().await;
        let mut events: Vec<DownloadEvent> = inner
            .events
            .iter()
            .filter(|e| e.share_id == share_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.at);
        Ok(events)
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.events.len();
        inner.events.retain(|e| e.at >= cutoff);
        Ok((before - inner.events.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use filecask_entity::share::NewShareRecord;

    fn new_record(now: DateTime<Utc>, code: &str, max_downloads: i32) -> ShareRecord {
        NewShareRecord {
            content_hash: "cafebabe".to_string(),
            original_name: "notes.txt".to_string(),
            size_bytes: 12,
            content_type: "txt".to_string(),
            uploader_ip: "10.0.0.1".to_string(),
            expires_at: Some(now + Duration::days(7)),
            max_downloads,
            description: None,
        }
        .into_record(code.to_string(), now)
    }

    #[tokio::test]
    async fn duplicate_code_is_a_conflict() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        store.create(new_record(now, "aB3xY9", 1)).await.unwrap();
        let err = store
            .create(new_record(now, "aB3xY9", 1))
            .await
            .expect_err("duplicate code must be rejected");
        assert_eq!(err.kind, filecask_core::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn stale_version_update_is_rejected() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        let record = store.create(new_record(now, "aB3xY9", 1)).await.unwrap();

        let mut first = record.clone();
        first.description = Some("first".to_string());
        store.update(first).await.unwrap();

        let mut second = record;
        second.description = Some("second".to_string());
        let err = store.update(second).await.expect_err("stale update");
        assert_eq!(err.kind, filecask_core::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn commit_increments_and_logs_as_one_unit() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        let record = store.create(new_record(now, "aB3xY9", 2)).await.unwrap();

        let event = DownloadEvent::new(record.id, "10.0.0.2", now, None);
        let commit = store.commit_redemption(record.id, event, now).await.unwrap();

        let committed = match commit {
            RedeemCommit::Committed(r) => r,
            other => panic!("expected commit, got {other:?}"),
        };
        assert_eq!(committed.download_count, 1);
        assert_eq!(store.events_for(record.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_commits_never_exceed_the_cap() {
        let store = Arc::new(MemoryShareStore::new());
        let now = Utc::now();
        let record = store.create(new_record(now, "aB3xY9", 1)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            let id = record.id;
            handles.push(tokio::spawn(async move {
                let event = DownloadEvent::new(id, format!("10.0.0.{i}"), now, None);
                store.commit_redemption(id, event, now).await.unwrap()
            }));
        }

        let mut committed = 0;
        for handle in handles {
            if let RedeemCommit::Committed(_) = handle.await.unwrap() {
                committed += 1;
            }
        }

        assert_eq!(committed, 1);
        let stored = store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.download_count, 1);
        assert_eq!(store.events_for(record.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_if_expired_skips_renewed_records() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        let mut record = new_record(now, "aB3xY9", 1);
        record.expires_at = Some(now - Duration::seconds(10));
        let record = store.create(record).await.unwrap();

        // Renew before the sweep gets to it.
        let mut renewed = record.clone();
        renewed.expires_at = Some(now + Duration::days(1));
        store.update(renewed).await.unwrap();

        assert!(!store.delete_if_expired(record.id, now).await.unwrap());
        assert!(store.find_by_id(record.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_cascades_events() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        let record = store.create(new_record(now, "aB3xY9", 0)).await.unwrap();
        let event = DownloadEvent::new(record.id, "10.0.0.2", now, None);
        store.commit_redemption(record.id, event, now).await.unwrap();

        assert!(store.delete(record.id).await.unwrap());
        assert!(store.events_for(record.id).await.unwrap().is_empty());
        assert!(store.find_by_code("aB3xY9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        store.create(new_record(now, "aaaaa1", 1)).await.unwrap();
        store
            .create(new_record(now + Duration::seconds(5), "bbbbb2", 1))
            .await
            .unwrap();

        let page = store.list(&PageRequest::default()).await.unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0].code, "bbbbb2");
    }
}
