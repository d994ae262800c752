//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod admin;
pub mod logging;
pub mod share;
pub mod sweep;
pub mod throttle;

use serde::{Deserialize, Serialize};

pub use self::admin::AdminConfig;
pub use self::logging::LoggingConfig;
pub use self::share::ShareConfig;
pub use self::sweep::SweepConfig;
pub use self::throttle::{DownloadScope, ThrottleConfig, WindowConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Extraction code and share record settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// Attempt throttling settings.
    #[serde(default)]
    pub throttle: ThrottleConfig,
    /// Administrator authentication settings.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Expiry sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `FILECASK`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FILECASK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
