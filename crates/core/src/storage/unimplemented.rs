//! Stand-in for repositories a backend does not provide.
//!
//! Every call fails with [`RepositoryError::Unimplemented`]; nothing ever
//! reports an empty success.

use async_trait::async_trait;
use uuid::Uuid;

use crate::invitation::{
    Event, EventPatch, Invitee, InviteePatch, InviteeStatus, NewEvent, NewInvitee, NewUser, User,
    UserPatch,
};

use super::{EventRepository, InviteeRepository, RepositoryError, Result, UserRepository};

/// Repository that rejects every operation.
#[derive(Debug, Clone, Copy)]
pub struct UnimplementedRepository {
    backend: &'static str,
}

impl UnimplementedRepository {
    pub fn new(backend: &'static str) -> Self {
        Self { backend }
    }

    fn fail<T>(&self, entity_type: &'static str) -> Result<T> {
        Err(RepositoryError::Unimplemented {
            entity_type,
            backend: self.backend,
        })
    }
}

#[async_trait]
impl UserRepository for UnimplementedRepository {
    async fn find_all(&self) -> Result<Vec<User>> {
        self.fail("User")
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>> {
        self.fail("User")
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        self.fail("User")
    }

    async fn create(&self, _user: NewUser) -> Result<User> {
        self.fail("User")
    }

    async fn update(&self, _id: Uuid, _patch: UserPatch) -> Result<Option<User>> {
        self.fail("User")
    }

    async fn delete(&self, _id: Uuid) -> Result<()> {
        self.fail("User")
    }
}

#[async_trait]
impl EventRepository for UnimplementedRepository {
    async fn find_all(&self) -> Result<Vec<Event>> {
        self.fail("Event")
    }

    async fn find_by_user_id(&self, _user_id: Uuid) -> Result<Vec<Event>> {
        self.fail("Event")
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Event>> {
        self.fail("Event")
    }

    async fn create(&self, _event: NewEvent) -> Result<Event> {
        self.fail("Event")
    }

    async fn update(&self, _id: Uuid, _patch: EventPatch) -> Result<Option<Event>> {
        self.fail("Event")
    }

    async fn delete(&self, _id: Uuid) -> Result<()> {
        self.fail("Event")
    }
}

#[async_trait]
impl InviteeRepository for UnimplementedRepository {
    async fn find_all(&self) -> Result<Vec<Invitee>> {
        self.fail("Invitee")
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Invitee>> {
        self.fail("Invitee")
    }

    async fn find_by_event_id(&self, _event_id: Uuid) -> Result<Vec<Invitee>> {
        self.fail("Invitee")
    }

    async fn find_by_user_id(&self, _user_id: Uuid) -> Result<Vec<Invitee>> {
        self.fail("Invitee")
    }

    async fn create(&self, _invitee: NewInvitee) -> Result<Invitee> {
        self.fail("Invitee")
    }

    async fn update(&self, _id: Uuid, _patch: InviteePatch) -> Result<Option<Invitee>> {
        self.fail("Invitee")
    }

    async fn delete(&self, _id: Uuid) -> Result<()> {
        self.fail("Invitee")
    }

    async fn update_status(&self, _id: Uuid, _status: InviteeStatus) -> Result<Invitee> {
        self.fail("Invitee")
    }
}
