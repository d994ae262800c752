//! Attempt throttling configuration.

use serde::{Deserialize, Serialize};

/// Sliding window + lockout parameters for one throttle context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Lookback window in seconds for counting attempts.
    pub window_seconds: i64,
    /// Maximum attempts within the window before the block trips.
    pub max_attempts: u32,
    /// Hard block duration in seconds once the threshold is exceeded.
    pub block_seconds: i64,
}

impl WindowConfig {
    /// Creates a window configuration.
    pub fn new(window_seconds: i64, max_attempts: u32, block_seconds: i64) -> Self {
        Self {
            window_seconds,
            max_attempts,
            block_seconds,
        }
    }
}

/// Subject key strategy for download-frequency limiting.
///
/// The upstream behavior was ambiguous between keying on the client
/// address alone and on the address plus file, so it is a configuration
/// choice rather than a hardcoded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadScope {
    /// One window per (client IP, share) pair.
    PerShare,
    /// One window per client IP across all shares.
    PerIp,
}

impl Default for DownloadScope {
    fn default() -> Self {
        Self::PerShare
    }
}

/// All throttle contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Extraction-code guess throttle, keyed by source IP.
    #[serde(default = "default_guess")]
    pub guess: WindowConfig,
    /// Per-file download-frequency throttle.
    #[serde(default = "default_download")]
    pub download: WindowConfig,
    /// Subject key strategy for the download-frequency throttle.
    #[serde(default)]
    pub download_scope: DownloadScope,
    /// Admin login throttle, keyed by source IP and backed by the
    /// durable attempt log.
    #[serde(default = "default_admin_login")]
    pub admin_login: WindowConfig,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            guess: default_guess(),
            download: default_download(),
            download_scope: DownloadScope::default(),
            admin_login: default_admin_login(),
        }
    }
}

fn default_guess() -> WindowConfig {
    WindowConfig::new(300, 5, 300)
}

fn default_download() -> WindowConfig {
    WindowConfig::new(300, 3, 300)
}

fn default_admin_login() -> WindowConfig {
    WindowConfig::new(300, 5, 300)
}
