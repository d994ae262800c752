//! In-memory attempt throttle keyed by subject.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::warn;

use filecask_core::config::throttle::WindowConfig;
use filecask_core::result::AppResult;

use super::window::WindowState;
use super::{AttemptThrottle, Decision};

/// Process-lifetime throttle map.
///
/// Subject entries are created lazily on first attempt and never torn
/// down; unbounded growth across many distinct subjects is an accepted
/// operational caveat to monitor, not capped here. After a restart the
/// worst case is one extra guessing window, which is acceptable for the
/// contexts this backing is used for.
#[derive(Debug)]
pub struct MemoryThrottle {
    /// Window parameters for every subject.
    config: WindowConfig,
    /// Per-subject window state. The map entry lock serializes
    /// concurrent updates for the same subject.
    subjects: DashMap<String, WindowState>,
}

impl MemoryThrottle {
    /// Creates a throttle with the given window parameters.
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            subjects: DashMap::new(),
        }
    }

    /// Number of distinct subjects tracked so far.
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }
}

#[async_trait]
impl AttemptThrottle for MemoryThrottle {
    async fn record(&self, subject: &str, now: DateTime<Utc>) -> AppResult<Decision> {
        let mut state = self.subjects.entry(subject.to_string()).or_default();
        let decision = state.record(now, &self.config);

        if !decision.allowed {
            warn!(
                subject = %subject,
                retry_after = ?decision.retry_after_seconds,
                "Attempt throttled"
            );
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn throttle() -> MemoryThrottle {
        MemoryThrottle::new(WindowConfig::new(300, 5, 300))
    }

    #[tokio::test]
    async fn subjects_are_independent() {
        let throttle = throttle();
        let now = Utc::now();

        for _ in 0..6 {
            throttle.record("10.0.0.1", now).await.unwrap();
        }
        assert!(!throttle.record("10.0.0.1", now).await.unwrap().allowed);
        assert!(throttle.record("10.0.0.2", now).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn blocked_subject_recovers_after_block() {
        let throttle = throttle();
        let now = Utc::now();

        for _ in 0..6 {
            throttle.record("10.0.0.1", now).await.unwrap();
        }
        assert!(
            !throttle
                .record("10.0.0.1", now + Duration::seconds(100))
                .await
                .unwrap()
                .allowed
        );
        assert!(
            throttle
                .record("10.0.0.1", now + Duration::seconds(301))
                .await
                .unwrap()
                .allowed
        );
    }

    #[tokio::test]
    async fn concurrent_attempts_for_one_subject_serialize() {
        let throttle = Arc::new(throttle());
        let now = Utc::now();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let throttle = Arc::clone(&throttle);
            handles.push(tokio::spawn(async move {
                throttle.record("10.0.0.1", now).await.unwrap()
            }));
        }

        let allowed = {
            let mut n = 0;
            for handle in handles {
                if handle.await.unwrap().allowed {
                    n += 1;
                }
            }
            n
        };

        // Exactly the first five attempts pass; every later one lands on
        // the block that the sixth set.
        assert_eq!(allowed, 5);
    }
}
