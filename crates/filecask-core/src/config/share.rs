//! Extraction code and share record configuration.

use serde::{Deserialize, Serialize};

/// Settings governing code generation and record defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Length of generated extraction codes, in characters.
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// Maximum attempts to allocate a unique code before failing the upload.
    #[serde(default = "default_allocation_attempts")]
    pub max_allocation_attempts: u32,
    /// Default record lifetime in days when the uploader gives none.
    #[serde(default = "default_expire_days")]
    pub default_expire_days: i64,
    /// Upper bound on the record lifetime an uploader may request.
    #[serde(default = "default_max_expire_days")]
    pub max_expire_days: i64,
    /// Default download cap for new records (0 = unlimited).
    #[serde(default = "default_max_downloads")]
    pub default_max_downloads: i32,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            max_allocation_attempts: default_allocation_attempts(),
            default_expire_days: default_expire_days(),
            max_expire_days: default_max_expire_days(),
            default_max_downloads: default_max_downloads(),
        }
    }
}

fn default_code_length() -> usize {
    6
}

fn default_allocation_attempts() -> u32 {
    10
}

fn default_expire_days() -> i64 {
    7
}

fn default_max_expire_days() -> i64 {
    30
}

fn default_max_downloads() -> i32 {
    1
}
