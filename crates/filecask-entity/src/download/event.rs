//! Download event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filecask_core::types::{EventId, ShareId};

/// Append-only audit entry for one successful redemption.
///
/// Owned by its [`ShareRecord`](crate::share::ShareRecord) and
/// cascade-deleted with it. Queried for download-frequency throttling
/// and audit; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// The record this download was redeemed against.
    pub share_id: ShareId,
    /// Downloader's IP address.
    pub ip: String,
    /// When the download was authorized.
    pub at: DateTime<Utc>,
    /// Client user-agent string, when supplied.
    pub user_agent: Option<String>,
}

impl DownloadEvent {
    /// Creates a new event for the given record and requester.
    pub fn new(
        share_id: ShareId,
        ip: impl Into<String>,
        at: DateTime<Utc>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            id: EventId::new(),
            share_id,
            ip: ip.into(),
            at,
            user_agent,
        }
    }
}
