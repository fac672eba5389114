use std::sync::Arc;

use uuid::Uuid;

use inviteazy_core::invitation::{Event, EventPatch, NewEvent};
use inviteazy_core::storage::{EventRepository, Result};

/// Event operations, delegated to the event repository.
#[derive(Clone)]
pub struct EventService {
    repo: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Event>> {
        self.repo.find_all().await
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Event>> {
        self.repo.find_by_user_id(user_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Event>> {
        self.repo.find_by_id(id).await
    }

    pub async fn create(&self, event: NewEvent) -> Result<Event> {
        let event = self.repo.create(event).await?;
        tracing::info!(event_id = %event.id, user_id = %event.user_id, "Created event");
        Ok(event)
    }

    pub async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        self.repo.update(id, patch).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::info!(event_id = %id, "Deleted event");
        Ok(())
    }
}
