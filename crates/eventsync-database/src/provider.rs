//! Repository selection from configuration.

use std::sync::Arc;

use tracing::info;

use eventsync_core::config::DatabaseConfig;
use eventsync_core::error::AppError;
use eventsync_core::result::AppResult;

use crate::connection::connect_pool;
use crate::migration::run_migrations;
use crate::repositories::{EventRepository, MemoryEventRepository, PgEventRepository};

/// Build the configured event repository.
///
/// For `postgres`, connects the pool and applies pending migrations when
/// `run_migrations` is set.
pub async fn build_repository(config: &DatabaseConfig) -> AppResult<Arc<dyn EventRepository>> {
    match config.provider.as_str() {
        "memory" => {
            info!("Initializing in-memory event store");
            Ok(Arc::new(MemoryEventRepository::new()))
        }
        "postgres" => {
            let pool = connect_pool(config).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            Ok(Arc::new(PgEventRepository::new(pool)))
        }
        other => Err(AppError::configuration(format!(
            "Unknown database provider: '{other}'. Supported: memory, postgres"
        ))),
    }
}
