//! In-process event repository for tests and single-node deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use eventsync_core::error::AppError;
use eventsync_core::result::AppResult;
use eventsync_core::types::EventId;
use eventsync_entity::{Event, EventContent};

use super::EventRepository;

#[derive(Debug, Default)]
struct InnerState {
    events: HashMap<EventId, Event>,
    /// Uniqueness index: fingerprint to owning id.
    by_fingerprint: HashMap<String, EventId>,
}

/// Event repository backed by two maps behind one Tokio mutex.
///
/// The fingerprint check and the write happen under the same lock
/// acquisition, which gives the atomic test-and-set the store contract
/// requires. The lock is never held across an await on anything else.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventRepository {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryEventRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(fingerprint: &str, existing: EventId) -> AppError {
    AppError::duplicate_content(format!(
        "fingerprint {fingerprint} already held by event {existing}"
    ))
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn find_by_id(&self, id: EventId) -> AppResult<Option<Event>> {
        let state = self.state.lock().await;
        Ok(state.events.get(&id).cloned())
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> AppResult<Option<Event>> {
        let state = self.state.lock().await;
        Ok(state
            .by_fingerprint
            .get(fingerprint)
            .and_then(|id| state.events.get(id))
            .cloned())
    }

    async fn insert(&self, fingerprint: String, content: EventContent) -> AppResult<Event> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.by_fingerprint.get(&fingerprint) {
            return Err(duplicate(&fingerprint, *existing));
        }

        let event = Event::new(EventId::new(), fingerprint, content, Utc::now());
        state
            .by_fingerprint
            .insert(event.fingerprint.clone(), event.id);
        state.events.insert(event.id, event.clone());

        debug!(event_id = %event.id, total = state.events.len(), "Event inserted");
        Ok(event)
    }

    async fn update(
        &self,
        id: EventId,
        fingerprint: String,
        content: EventContent,
    ) -> AppResult<Event> {
        let mut state = self.state.lock().await;
        let InnerState {
            events,
            by_fingerprint,
        } = &mut *state;

        let event = events
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("event {id} not found")))?;

        if let Some(owner) = by_fingerprint.get(&fingerprint) {
            if *owner != id {
                return Err(duplicate(&fingerprint, *owner));
            }
        }

        if event.fingerprint != fingerprint {
            by_fingerprint.remove(&event.fingerprint);
            by_fingerprint.insert(fingerprint.clone(), id);
            event.fingerprint = fingerprint;
        }
        event.content = content;
        event.updated_at = Utc::now();

        debug!(event_id = %id, "Event updated");
        Ok(event.clone())
    }

    async fn delete(&self, id: EventId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let event = state
            .events
            .remove(&id)
            .ok_or_else(|| AppError::not_found(format!("event {id} not found")))?;
        state.by_fingerprint.remove(&event.fingerprint);

        debug!(event_id = %id, total = state.events.len(), "Event deleted");
        Ok(())
    }

    async fn list_ids(&self) -> AppResult<Vec<EventId>> {
        let state = self.state.lock().await;
        let mut ids: Vec<EventId> = state.events.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.state.lock().await.events.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
