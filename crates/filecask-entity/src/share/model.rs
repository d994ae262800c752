//! Share record entity model and validity policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filecask_core::types::ShareId;

/// Outcome of evaluating a record's validity at a given instant.
///
/// The distinction is internal: external messaging collapses the arms
/// where a finer answer would help someone enumerate codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    /// The record may be redeemed.
    Valid,
    /// The record was disabled by an administrator.
    Deactivated,
    /// The download cap has been reached.
    Exhausted,
    /// The expiry deadline has passed.
    Expired,
}

/// Metadata and quota state for one shared file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRecord {
    /// Unique record identifier.
    pub id: ShareId,
    /// Unique case-sensitive alphanumeric extraction code.
    pub code: String,
    /// Content hash used as the storage key (deduplicates identical uploads).
    pub content_hash: String,
    /// Original display name of the uploaded file.
    pub original_name: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// File extension or MIME-ish type tag.
    pub content_type: String,
    /// Uploader's IP address (IPv6-capable textual form).
    pub uploader_ip: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record expires. `None` means no deadline.
    pub expires_at: Option<DateTime<Utc>>,
    /// Number of successful redemptions so far. Monotonically non-decreasing.
    pub download_count: i32,
    /// Maximum redemptions allowed. 0 means unlimited.
    pub max_downloads: i32,
    /// Whether the record is redeemable at all. Flipped by admins only.
    pub is_active: bool,
    /// Optional uploader-supplied description.
    pub description: Option<String>,
    /// Optimistic-concurrency counter, bumped on every store update.
    pub version: i64,
}

impl ShareRecord {
    /// Evaluates the validity policy at `now`.
    ///
    /// A record is valid iff it is active, its download cap (when set) is
    /// not reached, and its expiry deadline (when set) has not passed.
    /// Conditions are checked in that order; the first failure wins.
    pub fn validity(&self, now: DateTime<Utc>) -> Validity {
        if !self.is_active {
            return Validity::Deactivated;
        }
        if self.max_downloads > 0 && self.download_count >= self.max_downloads {
            return Validity::Exhausted;
        }
        if let Some(expires_at) = self.expires_at {
            if now > expires_at {
                return Validity::Expired;
            }
        }
        Validity::Valid
    }

    /// Convenience wrapper for callers that only need a yes/no answer.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.validity(now) == Validity::Valid
    }

    /// Whether the expiry deadline has passed at `now`.
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }
}

/// Data required to create a new share record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShareRecord {
    /// Content hash used as the storage key.
    pub content_hash: String,
    /// Original display name.
    pub original_name: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// File extension or MIME-ish type tag.
    pub content_type: String,
    /// Uploader's IP address.
    pub uploader_ip: String,
    /// Expiry deadline (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// Download cap (0 = unlimited).
    pub max_downloads: i32,
    /// Optional description.
    pub description: Option<String>,
}

impl NewShareRecord {
    /// Materializes a full record with the given code and creation time.
    pub fn into_record(self, code: String, now: DateTime<Utc>) -> ShareRecord {
        ShareRecord {
            id: ShareId::new(),
            code,
            content_hash: self.content_hash,
            original_name: self.original_name,
            size_bytes: self.size_bytes,
            content_type: self.content_type,
            uploader_ip: self.uploader_ip,
            created_at: now,
            expires_at: self.expires_at,
            download_count: 0,
            max_downloads: self.max_downloads,
            is_active: true,
            description: self.description,
            version: 0,
        }
    }
}
