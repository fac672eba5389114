use async_trait::async_trait;
use uuid::Uuid;

use crate::invitation::{
    Event, EventPatch, Invitee, InviteePatch, InviteeStatus, NewEvent, NewInvitee, NewUser, User,
    UserPatch,
};

use super::Result;

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets every user.
    async fn find_all(&self) -> Result<Vec<User>>;

    /// Gets a user by ID. Returns `None` when absent.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Creates a user. Fails with `AlreadyExists` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Applies a partial update. Returns `None` when the user is absent.
    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>>;

    /// Deletes a user. Deleting a missing user is not an error.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository for events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Gets every event.
    async fn find_all(&self) -> Result<Vec<Event>>;

    /// Gets the events created by a user.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Event>>;

    /// Gets an event by ID. Returns `None` when absent.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>>;

    /// Creates an event, assigning its ID and timestamps.
    async fn create(&self, event: NewEvent) -> Result<Event>;

    /// Applies a partial update and bumps `updated_at`. Returns `None` when the
    /// event is absent.
    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>>;

    /// Deletes an event. Deleting a missing event is not an error.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository for event invitees.
#[async_trait]
pub trait InviteeRepository: Send + Sync {
    /// Gets every invitee.
    async fn find_all(&self) -> Result<Vec<Invitee>>;

    /// Gets an invitee by ID. Returns `None` when absent.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitee>>;

    /// Gets the invitees of an event.
    async fn find_by_event_id(&self, event_id: Uuid) -> Result<Vec<Invitee>>;

    /// Gets the invitations a user received.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Invitee>>;

    /// Creates an invitee with `pending` status and a generated check-in token
    /// unless the request supplies them.
    async fn create(&self, invitee: NewInvitee) -> Result<Invitee>;

    /// Applies a partial update. Returns `None` when the invitee is absent.
    async fn update(&self, id: Uuid, patch: InviteePatch) -> Result<Option<Invitee>>;

    /// Deletes an invitee. Deleting a missing invitee is not an error.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Sets the RSVP status.
    ///
    /// Unlike `update`, fails with `NotFound` when the invitee is absent.
    async fn update_status(&self, id: Uuid, status: InviteeStatus) -> Result<Invitee>;
}
