//! Durable attempt throttle backed by the admin attempt log.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use filecask_core::config::throttle::WindowConfig;
use filecask_core::result::AppResult;
use filecask_entity::admin::AdminLoginAttempt;
use filecask_store::AdminAttemptStore;

use super::{AttemptThrottle, Decision};

/// Lockout tracker whose window is reconstructed from the persisted
/// attempt log, so restarting the process cannot reset an active block.
///
/// Unlike the in-memory variant, the attempt rows themselves are written
/// by the login flow after the credential comparison; this throttle only
/// reads them and appends block markers. The triggering attempt still
/// counts against the window because the failure row lands in the log
/// before the next gate check.
#[derive(Clone)]
pub struct DurableThrottle {
    /// Window parameters.
    config: WindowConfig,
    /// The durable log.
    store: Arc<dyn AdminAttemptStore>,
}

impl std::fmt::Debug for DurableThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableThrottle")
            .field("config", &self.config)
            .finish()
    }
}

impl DurableThrottle {
    /// Creates a throttle over the given attempt log.
    pub fn new(config: WindowConfig, store: Arc<dyn AdminAttemptStore>) -> Self {
        Self { config, store }
    }
}

#[async_trait]
impl AttemptThrottle for DurableThrottle {
    async fn record(&self, subject: &str, now: DateTime<Utc>) -> AppResult<Decision> {
        if let Some(blocked_until) = self.store.active_block(subject, now).await? {
            return Ok(Decision::blocked((blocked_until - now).num_seconds()));
        }

        let since = now - Duration::seconds(self.config.window_seconds);
        let failures = self.store.failed_count_since(subject, since).await?;

        if failures >= self.config.max_attempts {
            let blocked_until = now + Duration::seconds(self.config.block_seconds);
            self.store
                .append(AdminLoginAttempt::block_marker(subject, now, blocked_until))
                .await?;
            warn!(
                subject = %subject,
                failures = failures,
                blocked_until = %blocked_until,
                "Admin login lockout tripped"
            );
            return Ok(Decision::blocked(self.config.block_seconds));
        }

        Ok(Decision::allowed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filecask_store::MemoryAttemptStore;

    fn throttle(store: Arc<MemoryAttemptStore>) -> DurableThrottle {
        DurableThrottle::new(WindowConfig::new(300, 5, 300), store)
    }

    #[tokio::test]
    async fn gate_opens_until_failures_reach_the_threshold() {
        let store = Arc::new(MemoryAttemptStore::new());
        let throttle = throttle(Arc::clone(&store));
        let now = Utc::now();

        for _ in 0..4 {
            store
                .append(AdminLoginAttempt::new("1.2.3.4", now, false))
                .await
                .unwrap();
            assert!(throttle.record("1.2.3.4", now).await.unwrap().allowed);
        }

        store
            .append(AdminLoginAttempt::new("1.2.3.4", now, false))
            .await
            .unwrap();
        let decision = throttle.record("1.2.3.4", now).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_seconds, Some(300));
    }

    #[tokio::test]
    async fn block_marker_persists_across_throttle_instances() {
        let store = Arc::new(MemoryAttemptStore::new());
        let now = Utc::now();

        for _ in 0..5 {
            store
                .append(AdminLoginAttempt::new("1.2.3.4", now, false))
                .await
                .unwrap();
        }
        assert!(
            !throttle(Arc::clone(&store))
                .record("1.2.3.4", now)
                .await
                .unwrap()
                .allowed
        );

        // A fresh instance over the same log still sees the lockout.
        let rebuilt = throttle(Arc::clone(&store));
        let decision = rebuilt
            .record("1.2.3.4", now + Duration::seconds(10))
            .await
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_seconds, Some(290));
    }

    #[tokio::test]
    async fn failures_outside_the_window_do_not_count() {
        let store = Arc::new(MemoryAttemptStore::new());
        let throttle = throttle(Arc::clone(&store));
        let now = Utc::now();

        for _ in 0..5 {
            store
                .append(AdminLoginAttempt::new(
                    "1.2.3.4",
                    now - Duration::seconds(301),
                    false,
                ))
                .await
                .unwrap();
        }

        assert!(throttle.record("1.2.3.4", now).await.unwrap().allowed);
    }
}
