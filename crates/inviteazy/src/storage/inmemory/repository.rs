//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inviteazy_core::invitation::{
    timestamp_now, Event, EventPatch, Invitee, InviteePatch, InviteeStatus, NewEvent, NewInvitee,
    NewUser, User, UserPatch,
};
use inviteazy_core::storage::{
    EventRepository, InviteeRepository, RepositoryError, Result, UserRepository,
};

/// In-memory storage backend for testing and local development.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
    invitees: Arc<RwLock<HashMap<Uuid, Invitee>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Collects matching values ordered by creation time, like the SQL backends.
fn sorted<'a, T, F, K>(values: impl Iterator<Item = &'a T>, filter: F, key: K) -> Vec<T>
where
    T: Clone + 'a,
    F: Fn(&T) -> bool,
    K: Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid),
{
    let mut out: Vec<T> = values.filter(|v| filter(*v)).cloned().collect();
    out.sort_by_key(|v| key(v));
    out
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_all(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(sorted(users.values(), |_| true, |u| (u.created_at, u.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email,
            });
        }
        let user = user.into_user(Uuid::new_v4(), timestamp_now());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>> {
        if patch.is_empty() {
            return UserRepository::find_by_id(self, id).await;
        }
        let mut users = self.users.write().await;
        if let Some(email) = &patch.email {
            if email_taken(&users, email, Some(id)) {
                return Err(RepositoryError::AlreadyExists {
                    entity_type: "User",
                    id: email.clone(),
                });
            }
        }
        Ok(users.get_mut(&id).map(|user| {
            patch.apply_to(user);
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.users.write().await.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn find_all(&self) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        Ok(sorted(events.values(), |_| true, |e| (e.created_at, e.id)))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        Ok(sorted(
            events.values(),
            |e| e.user_id == user_id,
            |e| (e.created_at, e.id),
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned())
    }

    async fn create(&self, event: NewEvent) -> Result<Event> {
        let event = event.into_event(Uuid::new_v4(), timestamp_now());
        self.events.write().await.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        if patch.is_empty() {
            return EventRepository::find_by_id(self, id).await;
        }
        let mut events = self.events.write().await;
        Ok(events.get_mut(&id).map(|event| {
            patch.apply_to(event, timestamp_now());
            event.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.events.write().await.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl InviteeRepository for InMemoryRepository {
    async fn find_all(&self) -> Result<Vec<Invitee>> {
        let invitees = self.invitees.read().await;
        Ok(sorted(invitees.values(), |_| true, |i| (i.created_at, i.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitee>> {
        let invitees = self.invitees.read().await;
        Ok(invitees.get(&id).cloned())
    }

    async fn find_by_event_id(&self, event_id: Uuid) -> Result<Vec<Invitee>> {
        let invitees = self.invitees.read().await;
        Ok(sorted(
            invitees.values(),
            |i| i.event_id == event_id,
            |i| (i.created_at, i.id),
        ))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Invitee>> {
        let invitees = self.invitees.read().await;
        Ok(sorted(
            invitees.values(),
            |i| i.user_id == user_id,
            |i| (i.created_at, i.id),
        ))
    }

    async fn create(&self, invitee: NewInvitee) -> Result<Invitee> {
        let invitee = invitee.into_invitee(Uuid::new_v4(), timestamp_now());
        self.invitees
            .write()
            .await
            .insert(invitee.id, invitee.clone());
        Ok(invitee)
    }

    async fn update(&self, id: Uuid, patch: InviteePatch) -> Result<Option<Invitee>> {
        if patch.is_empty() {
            return InviteeRepository::find_by_id(self, id).await;
        }
        let mut invitees = self.invitees.write().await;
        Ok(invitees.get_mut(&id).map(|invitee| {
            patch.apply_to(invitee);
            invitee.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.invitees.write().await.remove(&id);
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: InviteeStatus) -> Result<Invitee> {
        let mut invitees = self.invitees.write().await;
        let invitee = invitees
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Invitee", id))?;
        invitee.status = status;
        Ok(invitee.clone())
    }
}
