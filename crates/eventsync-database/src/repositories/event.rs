//! PostgreSQL event repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use eventsync_core::error::{AppError, ErrorKind};
use eventsync_core::result::AppResult;
use eventsync_core::types::EventId;
use eventsync_entity::{Event, EventContent};

use super::EventRepository;

const COLUMNS: &str = "id, fingerprint, content, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    fingerprint: String,
    content: Json<EventContent>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::from_uuid(row.id),
            fingerprint: row.fingerprint,
            content: row.content.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Event repository backed by the `events` table.
///
/// Fingerprint uniqueness is enforced by the `events_fingerprint_key`
/// constraint; a violation surfaces as `DuplicateContent`.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Create a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write error, turning unique violations into `DuplicateContent`.
fn map_write_error(e: sqlx::Error, fingerprint: &str, action: &str) -> AppError {
    let unique_violation = matches!(
        &e,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    );
    if unique_violation {
        AppError::with_source(
            ErrorKind::DuplicateContent,
            format!("fingerprint {fingerprint} already stored"),
            e,
        )
    } else {
        AppError::with_source(ErrorKind::Database, format!("Failed to {action} event"), e)
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn find_by_id(&self, id: EventId) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, EventRow>(&format!("SELECT {COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Event::from))
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find event", e))
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {COLUMNS} FROM events WHERE fingerprint = $1"
        ))
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Event::from))
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find event by fingerprint", e)
        })
    }

    async fn insert(&self, fingerprint: String, content: EventContent) -> AppResult<Event> {
        let kind = content.kind().as_str();
        let authored_on = content.authored_on;

        sqlx::query_as::<_, EventRow>(&format!(
            "INSERT INTO events (id, fingerprint, kind, content, authored_on, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING {COLUMNS}"
        ))
        .bind(EventId::new())
        .bind(&fingerprint)
        .bind(kind)
        .bind(Json(&content))
        .bind(authored_on)
        .fetch_one(&self.pool)
        .await
        .map(Event::from)
        .map_err(|e| map_write_error(e, &fingerprint, "insert"))
    }

    async fn update(
        &self,
        id: EventId,
        fingerprint: String,
        content: EventContent,
    ) -> AppResult<Event> {
        let kind = content.kind().as_str();
        let authored_on = content.authored_on;

        sqlx::query_as::<_, EventRow>(&format!(
            "UPDATE events SET fingerprint = $2, kind = $3, content = $4, authored_on = $5, \
             updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&fingerprint)
        .bind(kind)
        .bind(Json(&content))
        .bind(authored_on)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &fingerprint, "update"))?
        .map(Event::from)
        .ok_or_else(|| AppError::not_found(format!("event {id} not found")))
    }

    async fn delete(&self, id: EventId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete event", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("event {id} not found")));
        }
        Ok(())
    }

    async fn list_ids(&self) -> AppResult<Vec<EventId>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM events ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map(|ids| ids.into_iter().map(EventId::from_uuid).collect())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list event ids", e))
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count events", e))?;
        Ok(total.max(0) as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
