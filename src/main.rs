//! Filecask — extraction-code gatekeeper for anonymous file sharing.
//!
//! Entry point that wires the stores, throttles, and services together
//! and runs the background sweep until shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use filecask_auth::{AdminAuthService, DurableThrottle, SessionGuard, SessionStore};
use filecask_core::clock::{Clock, SystemClock};
use filecask_core::config::AppConfig;
use filecask_core::error::AppError;
use filecask_service::{RedemptionService, ShareService};
use filecask_store::{
    AdminAttemptStore, DownloadLogStore, JsonlAttemptStore, MemoryShareStore, ShareStore,
};
use filecask_worker::SweepTask;

/// Fully wired engine handles, held for the lifetime of the process.
/// The HTTP/UI surface attaches to this state.
#[allow(dead_code)]
struct AppState {
    share_service: Arc<ShareService>,
    redemption: Arc<RedemptionService>,
    admin_auth: Arc<AdminAuthService>,
    session_guard: Arc<SessionGuard>,
}

#[tokio::main]
async fn main() {
    let env = std::env::var("FILECASK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Build the service graph and run until a shutdown signal.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Filecask v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    // Stores. Share records live in memory; the admin attempt log is
    // file-backed so the lockout survives restarts.
    let share_store = Arc::new(MemoryShareStore::new());
    let shares: Arc<dyn ShareStore> = Arc::clone(&share_store) as Arc<dyn ShareStore>;
    let downloads: Arc<dyn DownloadLogStore> = share_store as Arc<dyn DownloadLogStore>;

    tracing::info!(
        path = %config.admin.attempt_log_path,
        "Opening admin attempt log"
    );
    let attempts: Arc<dyn AdminAttemptStore> =
        Arc::new(JsonlAttemptStore::open(&config.admin.attempt_log_path).await?);

    // Services.
    let share_service = Arc::new(ShareService::new(
        config.share.clone(),
        Arc::clone(&shares),
        Arc::clone(&clock),
    ));
    let redemption = Arc::new(RedemptionService::new(
        &config.throttle,
        Arc::clone(&shares),
        Arc::clone(&downloads),
        Arc::clone(&clock),
    ));

    // Admin auth and session guard.
    let sessions = Arc::new(SessionStore::new());
    let admin_throttle = DurableThrottle::new(config.throttle.admin_login, Arc::clone(&attempts));
    let admin_auth = Arc::new(AdminAuthService::new(
        &config.admin,
        admin_throttle,
        Arc::clone(&attempts),
        Arc::clone(&sessions),
        Arc::clone(&clock),
    )?);
    let session_guard = Arc::new(SessionGuard::new(
        Arc::clone(&sessions),
        config.admin.session_timeout_seconds,
        Arc::clone(&clock),
    ));

    let _state = AppState {
        share_service,
        redemption,
        admin_auth,
        session_guard,
    };
    tracing::info!("Service graph initialized");

    // Background sweep.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = SweepTask::new(
        config.sweep.clone(),
        Arc::clone(&shares),
        Arc::clone(&downloads),
        Arc::clone(&attempts),
        Arc::clone(&clock),
    );
    let sweep_cancel = shutdown_rx.clone();
    let sweep_handle = tokio::spawn(async move {
        sweep.run(sweep_cancel).await;
    });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping background tasks...");
    let _ = shutdown_tx.send(true);

    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), sweep_handle).await;

    tracing::info!("Filecask shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
