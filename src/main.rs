//! EventSync Server: event store with search index synchronization
//!
//! Main entry point that wires all crates together and runs the background
//! worker until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use eventsync_core::config::AppConfig;
use eventsync_core::error::AppError;
use eventsync_core::traits::SearchIndex;
use eventsync_database::EventRepository;
use eventsync_service::{EventStore, IndexSynchronizer};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("EVENTSYNC_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
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

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EventSync v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Primary document store ───────────────────────────
    tracing::info!(provider = %config.database.provider, "Initializing event repository...");
    let repository = eventsync_database::build_repository(&config.database).await?;
    tracing::info!(backend = repository.backend(), "Event repository initialized");

    // ── Step 2: Search index ─────────────────────────────────────
    tracing::info!(provider = %config.search.provider, "Initializing search index...");
    let search = eventsync_search::provider::SearchManager::new(&config.search)?;
    let index = search.index();
    match index.health_check().await {
        Ok(true) => tracing::info!(backend = index.backend(), "Search index reachable"),
        Ok(false) | Err(_) => tracing::warn!(
            backend = index.backend(),
            "Search index not reachable; writes will be queued for resync"
        ),
    }

    // ── Step 3: Attachment storage ───────────────────────────────
    tracing::info!(provider = %config.storage.provider, "Initializing attachment storage...");
    let attachments = eventsync_storage::manager::AttachmentManager::new(&config.storage).await?;
    let attachments = attachments.store();

    // ── Step 4: Synchronizer + event store ───────────────────────
    let sync = Arc::new(IndexSynchronizer::new(index, &config.sync));
    let store = EventStore::new(repository, Arc::clone(&sync), attachments, &config.sync);
    tracing::info!(policy = ?sync.policy(), "Event store ready");

    // ── Step 5: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 6: Background worker ────────────────────────────────
    let worker_handle = if config.worker.enabled {
        tracing::info!("Starting background worker...");
        let runner = eventsync_worker::WorkerRunner::new(store.clone(), config.worker.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = runner.run(shutdown_rx).await {
                tracing::error!("Worker error: {}", e);
            }
        });
        Some(handle)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 7: Graceful shutdown ────────────────────────────────
    shutdown_signal().await?;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    match worker_handle {
        Some(handle) => {
            if tokio::time::timeout(Duration::from_secs(30), handle).await.is_err() {
                tracing::warn!("Worker did not stop within 30s");
            }
        }
        None => {
            if let Err(e) = sync.flush().await {
                tracing::error!("Final index flush failed: {}", e);
            }
        }
    }

    let stats = sync.stats();
    if stats.pending > 0 {
        tracing::warn!(pending = stats.pending, "Shutting down with unsynchronized events");
    }

    tracing::info!("EventSync server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() -> Result<(), AppError> {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| AppError::internal(format!("Failed to install Ctrl+C handler: {e}")))
    };

    #[cfg(unix)]
    let terminate = async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).map_err(
                |e| AppError::internal(format!("Failed to install SIGTERM handler: {e}")),
            )?;
        signal.recv().await;
        Ok::<(), AppError>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<(), AppError>>();

    tokio::select! {
        r = ctrl_c => r,
        r = terminate => r,
    }
}
