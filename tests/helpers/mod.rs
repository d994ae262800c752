//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use filecask_auth::{AdminAuthService, DurableThrottle, SessionGuard, SessionStore};
use filecask_core::clock::{Clock, ManualClock};
use filecask_core::config::AppConfig;
use filecask_entity::share::ShareRecord;
use filecask_service::{CreateShareRequest, RedemptionService, ShareService};
use filecask_store::{
    AdminAttemptStore, DownloadLogStore, MemoryAttemptStore, MemoryShareStore, ShareStore,
};
use filecask_worker::SweepTask;

/// The admin secret used throughout the integration tests.
pub const TEST_SECRET: &str = "correct horse battery staple";

/// Fully wired engine over in-memory stores and a manual clock.
pub struct TestEngine {
    pub config: AppConfig,
    pub clock: Arc<ManualClock>,
    pub shares: Arc<MemoryShareStore>,
    pub attempts: Arc<dyn AdminAttemptStore>,
    pub sessions: Arc<SessionStore>,
    pub share_service: ShareService,
    pub redemption: RedemptionService,
    pub admin_auth: AdminAuthService,
    pub guard: SessionGuard,
    pub sweep: SweepTask,
}

impl TestEngine {
    /// Builds the engine the way `main` does, with test-friendly knobs:
    /// zero login delay and a frozen manual clock.
    pub fn new() -> Self {
        let attempts: Arc<dyn AdminAttemptStore> = Arc::new(MemoryAttemptStore::new());
        Self::with_attempt_store(attempts)
    }

    /// Same as [`TestEngine::new`] but over a caller-supplied attempt
    /// store, for durability scenarios.
    pub fn with_attempt_store(attempts: Arc<dyn AdminAttemptStore>) -> Self {
        let mut config = AppConfig::default();
        config.admin.secret = TEST_SECRET.to_string();
        config.admin.login_delay_seconds = 0;

        let clock = Arc::new(ManualClock::now_frozen());
        let shares = Arc::new(MemoryShareStore::new());
        let sessions = Arc::new(SessionStore::new());

        let share_service = ShareService::new(
            config.share.clone(),
            Arc::clone(&shares) as Arc<dyn ShareStore>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        let redemption = RedemptionService::new(
            &config.throttle,
            Arc::clone(&shares) as Arc<dyn ShareStore>,
            Arc::clone(&shares) as Arc<dyn DownloadLogStore>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        let admin_auth = AdminAuthService::new(
            &config.admin,
            DurableThrottle::new(config.throttle.admin_login, Arc::clone(&attempts)),
            Arc::clone(&attempts),
            Arc::clone(&sessions),
            Arc::clone(&clock) as Arc<dyn Clock>,
        )
        .expect("admin auth construction");
        let guard = SessionGuard::new(
            Arc::clone(&sessions),
            config.admin.session_timeout_seconds,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        let sweep = SweepTask::new(
            config.sweep.clone(),
            Arc::clone(&shares) as Arc<dyn ShareStore>,
            Arc::clone(&shares) as Arc<dyn DownloadLogStore>,
            Arc::clone(&attempts),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );

        Self {
            config,
            clock,
            shares,
            attempts,
            sessions,
            share_service,
            redemption,
            admin_auth,
            guard,
            sweep,
        }
    }

    /// Uploads a file with the given cap and lifetime, returning the
    /// created record (its `code` is the handle for redemption).
    pub async fn upload(&self, max_downloads: i32, expire_days: i64) -> ShareRecord {
        self.share_service
            .create(CreateShareRequest {
                content_hash: "9b1a3c".to_string(),
                original_name: "drawing.dxf".to_string(),
                size_bytes: 4096,
                content_type: "dxf".to_string(),
                uploader_ip: "10.0.0.1".to_string(),
                expire_days: Some(expire_days),
                max_downloads: Some(max_downloads),
                description: None,
            })
            .await
            .expect("upload")
    }
}
