//! Share lifecycle — creation with code allocation, admin management.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use filecask_core::clock::Clock;
use filecask_core::config::share::ShareConfig;
use filecask_core::error::{AppError, ErrorKind};
use filecask_core::result::AppResult;
use filecask_core::types::{PageRequest, PageResponse, ShareId};
use filecask_entity::share::{NewShareRecord, ShareRecord};
use filecask_store::ShareStore;

use crate::code::CodeGenerator;

/// Upload metadata supplied by the caller. The file bytes themselves go
/// to the external storage collaborator, addressed by `content_hash`.
#[derive(Debug, Clone)]
pub struct CreateShareRequest {
    /// Content hash used as the storage key.
    pub content_hash: String,
    /// Original filename as uploaded.
    pub original_name: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// File extension or MIME-ish type tag.
    pub content_type: String,
    /// Uploader's IP address.
    pub uploader_ip: String,
    /// Requested lifetime in days; defaulted and clamped from config.
    pub expire_days: Option<i64>,
    /// Requested download cap; defaulted from config. 0 = unlimited.
    pub max_downloads: Option<i32>,
    /// Optional description.
    pub description: Option<String>,
}

/// Creates and administers share records.
pub struct ShareService {
    /// Record store.
    shares: Arc<dyn ShareStore>,
    /// Code generator.
    generator: CodeGenerator,
    /// Share configuration.
    config: ShareConfig,
    /// Reference clock.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService")
            .field("config", &self.config)
            .finish()
    }
}

impl ShareService {
    /// Creates the service.
    pub fn new(config: ShareConfig, shares: Arc<dyn ShareStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            shares,
            generator: CodeGenerator::new(config.code_length),
            config,
            clock,
        }
    }

    /// Registers an upload under a freshly allocated extraction code.
    ///
    /// Generation retries against the store's uniqueness constraint up
    /// to the configured attempt bound. Collisions are astronomically
    /// unlikely at low volume, but the bound keeps the upload path from
    /// ever spinning; exhausting it fails the upload with
    /// [`ErrorKind::AllocationFailed`].
    pub async fn create(&self, request: CreateShareRequest) -> AppResult<ShareRecord> {
        let now = self.clock.now();

        let expire_days = request
            .expire_days
            .unwrap_or(self.config.default_expire_days)
            .clamp(1, self.config.max_expire_days);
        let max_downloads = request
            .max_downloads
            .unwrap_or(self.config.default_max_downloads)
            .max(0);

        let new_record = NewShareRecord {
            content_hash: request.content_hash,
            original_name: sanitize_filename(&request.original_name, now.timestamp()),
            size_bytes: request.size_bytes,
            content_type: request.content_type,
            uploader_ip: request.uploader_ip,
            expires_at: Some(now + Duration::days(expire_days)),
            max_downloads,
            description: request.description,
        };

        for attempt in 1..=self.config.max_allocation_attempts {
            let code = self.generator.generate();
            let record = new_record.clone().into_record(code, now);

            match self.shares.create(record).await {
                Ok(record) => {
                    info!(share_id = %record.id, attempt = attempt, "Share created");
                    return Ok(record);
                }
                Err(e) if e.kind == ErrorKind::Conflict => {
                    debug!(attempt = attempt, "Code collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::allocation_failed(format!(
            "could not allocate a unique code in {} attempts",
            self.config.max_allocation_attempts
        )))
    }

    /// Enables or disables a record. Disabled records stay unredeemable
    /// until re-enabled here.
    pub async fn set_active(&self, id: ShareId, active: bool) -> AppResult<ShareRecord> {
        let mut record = self
            .shares
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("share record not found: {id}")))?;

        record.is_active = active;
        let record = self.shares.update(record).await?;
        info!(share_id = %id, active = active, "Share activation changed");
        Ok(record)
    }

    /// Deletes a record and its download events.
    pub async fn delete(&self, id: ShareId) -> AppResult<bool> {
        let deleted = self.shares.delete(id).await?;
        if deleted {
            info!(share_id = %id, "Share deleted by admin");
        }
        Ok(deleted)
    }

    /// Looks up a record by code for the admin view.
    pub async fn get_by_code(&self, code: &str) -> AppResult<Option<ShareRecord>> {
        self.shares.find_by_code(code).await
    }

    /// Lists records for the admin view, newest first.
    pub async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<ShareRecord>> {
        self.shares.list(page).await
    }
}

/// Strips path separators and shell-hostile characters from an uploaded
/// filename, falling back to a timestamp name when nothing survives.
fn sanitize_filename(name: &str, timestamp: i64) -> String {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let stem: String = stem
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect();
    let stem = stem.trim();

    let stem = if stem.is_empty() {
        format!("file_{timestamp}")
    } else {
        stem.to_string()
    };

    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}
