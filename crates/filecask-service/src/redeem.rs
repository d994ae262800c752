//! Redemption orchestration — throttle, lookup, validity, commit.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use filecask_auth::throttle::{AttemptThrottle, MemoryThrottle};
use filecask_core::clock::Clock;
use filecask_core::config::throttle::{DownloadScope, ThrottleConfig, WindowConfig};
use filecask_core::result::AppResult;
use filecask_core::types::DenyReason;
use filecask_entity::download::DownloadEvent;
use filecask_entity::share::{ShareRecord, Validity};
use filecask_store::{DownloadLogStore, RedeemCommit, ShareStore};

/// Result of a redemption attempt.
#[derive(Debug, Clone)]
pub enum RedeemOutcome {
    /// The caller may proceed with the transfer of this record.
    Authorized(ShareRecord),
    /// The attempt was denied.
    Denied(DenyReason),
}

impl RedeemOutcome {
    /// Whether the attempt was authorized.
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }
}

/// Decides whether a redemption attempt is allowed and commits the
/// download count + audit entry when a transfer is authorized.
pub struct RedemptionService {
    /// Record store.
    shares: Arc<dyn ShareStore>,
    /// Download event log, the window source for frequency limiting.
    downloads: Arc<dyn DownloadLogStore>,
    /// Code-guess throttle, keyed by source IP. In-memory: a restart
    /// costs at most one extra guessing window.
    guess_throttle: MemoryThrottle,
    /// Window parameters for download-frequency limiting.
    download_window: WindowConfig,
    /// Subject scope for download-frequency limiting.
    download_scope: DownloadScope,
    /// Reference clock.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RedemptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedemptionService")
            .field("download_window", &self.download_window)
            .field("download_scope", &self.download_scope)
            .finish()
    }
}

impl RedemptionService {
    /// Creates the service from throttle configuration and collaborators.
    pub fn new(
        config: &ThrottleConfig,
        shares: Arc<dyn ShareStore>,
        downloads: Arc<dyn DownloadLogStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shares,
            downloads,
            guess_throttle: MemoryThrottle::new(config.guess),
            download_window: config.download,
            download_scope: config.download_scope,
            clock,
        }
    }

    /// Checks whether `code` may be redeemed from `ip` right now.
    ///
    /// Steps short-circuit in order: empty input, guess throttle,
    /// lookup, validity. Nothing is mutated; the caller must go through
    /// [`authorize_transfer`](Self::authorize_transfer) for the actual
    /// download, which re-runs all of this — authorization is never
    /// cached across the gap.
    pub async fn redeem(&self, code: &str, ip: &str) -> AppResult<RedeemOutcome> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(RedeemOutcome::Denied(DenyReason::InvalidCode));
        }

        let now = self.clock.now();
        let gate = self.guess_throttle.record(ip, now).await?;
        if !gate.allowed {
            return Ok(RedeemOutcome::Denied(DenyReason::RateLimited {
                retry_after_seconds: gate.retry_after_seconds.unwrap_or(0),
            }));
        }

        let Some(record) = self.shares.find_by_code(code).await? else {
            debug!(ip = %ip, "Unknown extraction code");
            return Ok(RedeemOutcome::Denied(DenyReason::InvalidCode));
        };

        match record.validity(now) {
            Validity::Valid => Ok(RedeemOutcome::Authorized(record)),
            other => Ok(RedeemOutcome::Denied(deny_reason(other))),
        }
    }

    /// Authorizes an actual file transfer and commits its side effects.
    ///
    /// Re-validates everything `redeem` checks, applies the
    /// download-frequency limit from the event log, then atomically
    /// increments the counter and appends the [`DownloadEvent`] in one
    /// store transaction.
    pub async fn authorize_transfer(
        &self,
        code: &str,
        ip: &str,
        user_agent: Option<&str>,
    ) -> AppResult<RedeemOutcome> {
        let record = match self.redeem(code, ip).await? {
            RedeemOutcome::Authorized(record) => record,
            denied => return Ok(denied),
        };

        let now = self.clock.now();
        let since = now - Duration::seconds(self.download_window.window_seconds);
        let scope_share = match self.download_scope {
            DownloadScope::PerShare => Some(record.id),
            DownloadScope::PerIp => None,
        };

        let recent = self.downloads.recent_downloads(ip, scope_share, since).await?;
        if recent.len() as u32 >= self.download_window.max_attempts {
            // The window drains as its oldest event ages out.
            let retry_after = recent
                .first()
                .map(|e| {
                    (e.at + Duration::seconds(self.download_window.window_seconds) - now)
                        .num_seconds()
                })
                .unwrap_or(self.download_window.window_seconds);
            debug!(ip = %ip, share_id = %record.id, "Download frequency limit hit");
            return Ok(RedeemOutcome::Denied(DenyReason::RateLimited {
                retry_after_seconds: retry_after.max(1),
            }));
        }

        let event = DownloadEvent::new(record.id, ip, now, user_agent.map(String::from));
        match self.shares.commit_redemption(record.id, event, now).await? {
            RedeemCommit::Committed(record) => {
                info!(
                    share_id = %record.id,
                    download_count = record.download_count,
                    "Download authorized"
                );
                Ok(RedeemOutcome::Authorized(record))
            }
            RedeemCommit::Rejected(validity) => {
                Ok(RedeemOutcome::Denied(deny_reason(validity)))
            }
            RedeemCommit::NotFound => Ok(RedeemOutcome::Denied(DenyReason::InvalidCode)),
        }
    }
}

/// Maps an invalid record state to its denial reason.
fn deny_reason(validity: Validity) -> DenyReason {
    match validity {
        Validity::Deactivated => DenyReason::Deactivated,
        Validity::Exhausted => DenyReason::QuotaExhausted,
        Validity::Expired => DenyReason::Expired,
        Validity::Valid => unreachable!("valid records are not denied"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use filecask_core::clock::ManualClock;
    use filecask_entity::share::NewShareRecord;
    use filecask_store::MemoryShareStore;

    fn setup() -> (RedemptionService, Arc<MemoryShareStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryShareStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = RedemptionService::new(
            &ThrottleConfig::default(),
            Arc::clone(&store) as Arc<dyn ShareStore>,
            Arc::clone(&store) as Arc<dyn DownloadLogStore>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        (service, store, clock)
    }

    async fn seed(
        store: &MemoryShareStore,
        clock: &ManualClock,
        code: &str,
        max_downloads: i32,
    ) -> ShareRecord {
        let now = clock.now();
        let record = NewShareRecord {
            content_hash: "cafebabe".to_string(),
            original_name: "notes.txt".to_string(),
            size_bytes: 64,
            content_type: "txt".to_string(),
            uploader_ip: "10.0.0.1".to_string(),
            expires_at: Some(now + Duration::days(7)),
            max_downloads,
            description: None,
        }
        .into_record(code.to_string(), now);
        store.create(record).await.unwrap()
    }

    #[tokio::test]
    async fn empty_code_is_invalid_without_touching_the_store() {
        let (service, _, _) = setup();
        let outcome = service.redeem("   ", "10.0.0.2").await.unwrap();
        assert!(matches!(
            outcome,
            RedeemOutcome::Denied(DenyReason::InvalidCode)
        ));
    }

    #[tokio::test]
    async fn unknown_code_is_invalid() {
        let (service, _, _) = setup();
        let outcome = service.redeem("zZzZ99", "10.0.0.2").await.unwrap();
        assert!(matches!(
            outcome,
            RedeemOutcome::Denied(DenyReason::InvalidCode)
        ));
    }

    #[tokio::test]
    async fn denied_redeem_leaves_the_record_untouched() {
        let (service, store, clock) = setup();
        let record = seed(&store, &clock, "aB3xY9", 1).await;

        let mut stored = store.find_by_id(record.id).await.unwrap().unwrap();
        stored.is_active = false;
        store.update(stored).await.unwrap();

        let outcome = service.redeem("aB3xY9", "10.0.0.2").await.unwrap();
        assert!(matches!(
            outcome,
            RedeemOutcome::Denied(DenyReason::Deactivated)
        ));

        let after = store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(after.download_count, 0);
        assert!(!after.is_active);
    }

    #[tokio::test]
    async fn guess_throttle_blocks_the_sixth_attempt() {
        let (service, _, _) = setup();

        for _ in 0..5 {
            service.redeem("wrong1", "10.0.0.2").await.unwrap();
        }
        let outcome = service.redeem("wrong1", "10.0.0.2").await.unwrap();
        match outcome {
            RedeemOutcome::Denied(DenyReason::RateLimited {
                retry_after_seconds,
            }) => assert_eq!(retry_after_seconds, 300),
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transfer_commits_count_and_event() {
        let (service, store, clock) = setup();
        let record = seed(&store, &clock, "aB3xY9", 2).await;

        let outcome = service
            .authorize_transfer("aB3xY9", "10.0.0.2", Some("curl/8.0"))
            .await
            .unwrap();
        assert!(outcome.is_authorized());

        let stored = store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.download_count, 1);
        let events = store.events_for(record.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_agent.as_deref(), Some("curl/8.0"));
    }

    #[tokio::test]
    async fn expired_record_denies_regardless_of_quota() {
        let (service, store, clock) = setup();
        let record = seed(&store, &clock, "aB3xY9", 0).await;

        let mut stored = store.find_by_id(record.id).await.unwrap().unwrap();
        stored.expires_at = Some(clock.now() - Duration::seconds(1));
        store.update(stored).await.unwrap();

        let outcome = service.redeem("aB3xY9", "10.0.0.2").await.unwrap();
        assert!(matches!(outcome, RedeemOutcome::Denied(DenyReason::Expired)));
    }

    #[tokio::test]
    async fn frequency_limit_caps_repeat_downloads() {
        let (service, store, clock) = setup();
        seed(&store, &clock, "aB3xY9", 0).await;

        for _ in 0..3 {
            let outcome = service
                .authorize_transfer("aB3xY9", "10.0.0.2", None)
                .await
                .unwrap();
            assert!(outcome.is_authorized());
        }

        let outcome = service
            .authorize_transfer("aB3xY9", "10.0.0.2", None)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RedeemOutcome::Denied(DenyReason::RateLimited { .. })
        ));

        // Another client is unaffected.
        let outcome = service
            .authorize_transfer("aB3xY9", "10.0.0.3", None)
            .await
            .unwrap();
        assert!(outcome.is_authorized());

        // The window drains with time.
        clock.advance_seconds(301);
        let outcome = service
            .authorize_transfer("aB3xY9", "10.0.0.2", None)
            .await
            .unwrap();
        assert!(outcome.is_authorized());
    }

    #[tokio::test]
    async fn concurrent_transfers_respect_a_single_slot() {
        let (service, store, clock) = setup();
        let record = seed(&store, &clock, "aB3xY9", 1).await;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for i in 0..2 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .authorize_transfer("aB3xY9", &format!("10.0.1.{i}"), None)
                    .await
                    .unwrap()
            }));
        }

        let mut authorized = 0;
        let mut exhausted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                RedeemOutcome::Authorized(_) => authorized += 1,
                RedeemOutcome::Denied(DenyReason::QuotaExhausted) => exhausted += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(authorized, 1);
        assert_eq!(exhausted, 1);
        let stored = store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.download_count, 1);
    }
}
