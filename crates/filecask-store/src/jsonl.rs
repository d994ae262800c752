//! Durable admin attempt log backed by a JSON-lines file.
//!
//! Each row is one serialized [`AdminLoginAttempt`] per line, appended
//! synchronously before the caller proceeds. The full log is loaded at
//! startup and kept in memory for window queries; the file is the source
//! of truth across restarts, which is what makes the admin lockout a
//! real control rather than something a forced restart defeats.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use filecask_core::error::AppError;
use filecask_core::result::AppResult;
use filecask_entity::admin::AdminLoginAttempt;

use crate::admin::AdminAttemptStore;

/// File-backed append-only attempt log.
#[derive(Debug, Clone)]
pub struct JsonlAttemptStore {
    /// Path of the JSONL file.
    path: PathBuf,
    /// In-memory copy of all rows, guarded together with file writes.
    rows: Arc<Mutex<Vec<AdminLoginAttempt>>>,
}

impl JsonlAttemptStore {
    /// Opens (or creates) the log at `path`, loading any existing rows.
    ///
    /// Unparseable lines are skipped with a warning rather than failing
    /// startup; a partial audit trail beats no service.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut rows = Vec::new();
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                for (lineno, line) in contents.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<AdminLoginAttempt>(line) {
                        Ok(row) => rows.push(row),
                        Err(e) => {
                            warn!(
                                path = %path.display(),
                                line = lineno + 1,
                                error = %e,
                                "Skipping unparseable attempt log line"
                            );
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            rows: Arc::new(Mutex::new(rows)),
        })
    }

    /// Rewrites the whole file from the in-memory rows. Used by prune.
    async fn rewrite(&self, rows: &[AdminLoginAttempt]) -> AppResult<()> {
        let mut contents = String::new();
        for row in rows {
            contents.push_str(&serde_json::to_string(row)?);
            contents.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl AdminAttemptStore for JsonlAttemptStore {
    async fn append(&self, attempt: AdminLoginAttempt) -> AppResult<()> {
        let mut rows = self.rows.lock().await;

        let mut line = serde_json::to_string(&attempt)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                AppError::with_source(
                    filecask_core::ErrorKind::Store,
                    format!("failed to open attempt log {}", self.path.display()),
                    e,
                )
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        rows.push(attempt);
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
        let removed = (before - rows.len()) as u64;

        if removed > 0 {
            self.rewrite(&rows).await?;
        }
        Ok(removed)
    }
}
