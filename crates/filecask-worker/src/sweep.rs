//! Expiry sweep — removes dead share records and trims audit logs.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info};

use filecask_core::clock::Clock;
use filecask_core::config::sweep::SweepConfig;
use filecask_core::result::AppResult;
use filecask_store::{AdminAttemptStore, DownloadLogStore, ShareStore};

/// What one sweep cycle removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired share records deleted.
    pub shares_removed: u64,
    /// Download events pruned past retention.
    pub events_pruned: u64,
    /// Admin login attempts pruned past retention.
    pub attempts_pruned: u64,
}

/// Periodic maintenance task.
///
/// Expired records are re-checked at delete time, so a record whose
/// deadline was pushed out between the query and the delete survives
/// the sweep.
pub struct SweepTask {
    /// Share record store.
    shares: Arc<dyn ShareStore>,
    /// Download event log.
    downloads: Arc<dyn DownloadLogStore>,
    /// Admin login attempt log.
    attempts: Arc<dyn AdminAttemptStore>,
    /// Reference clock.
    clock: Arc<dyn Clock>,
    /// Sweep configuration.
    config: SweepConfig,
}

impl std::fmt::Debug for SweepTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepTask")
            .field("config", &self.config)
            .finish()
    }
}

impl SweepTask {
    /// Creates the task.
    pub fn new(
        config: SweepConfig,
        shares: Arc<dyn ShareStore>,
        downloads: Arc<dyn DownloadLogStore>,
        attempts: Arc<dyn AdminAttemptStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shares,
            downloads,
            attempts,
            clock,
            config,
        }
    }

    /// Runs one sweep cycle.
    pub async fn run_cycle(&self) -> AppResult<SweepReport> {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        let expired = self.shares.find_expired(now).await?;
        for record in expired {
            match self.shares.delete_if_expired(record.id, now).await {
                Ok(true) => {
                    debug!(share_id = %record.id, code = %record.code, "Swept expired share");
                    report.shares_removed += 1;
                }
                Ok(false) => {
                    debug!(share_id = %record.id, "Share renewed since query, skipped");
                }
                Err(e) => {
                    // One bad record must not starve the rest of the cycle.
                    error!(share_id = %record.id, error = %e, "Failed to sweep share");
                }
            }
        }

        let cutoff = now - Duration::days(self.config.log_retention_days);
        report.events_pruned = self.downloads.prune_older_than(cutoff).await?;
        report.attempts_pruned = self.attempts.prune_older_than(cutoff).await?;

        if report != SweepReport::default() {
            info!(
                shares = report.shares_removed,
                events = report.events_pruned,
                attempts = report.attempts_pruned,
                "Sweep cycle complete"
            );
        }
        Ok(report)
    }

    /// Runs sweep cycles on the configured interval until the cancel
    /// signal flips to `true`. Cycle failures are logged and the loop
    /// continues.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let period = StdDuration::from_secs(self.config.interval_minutes * 60);
        info!(
            interval_minutes = self.config.interval_minutes,
            retention_days = self.config.log_retention_days,
            "Sweep task started"
        );

        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        // The first tick fires immediately; sweep once at startup.
        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Sweep task received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!(error = %e, "Sweep cycle failed");
                    }
                }
            }
        }
    }
}
