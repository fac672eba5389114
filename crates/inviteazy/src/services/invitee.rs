use std::sync::Arc;

use uuid::Uuid;

use inviteazy_core::invitation::{
    guest_insights, timestamp_now, GuestInsights, Invitee, InviteePatch, InviteeStatus,
    NewInvitee,
};
use inviteazy_core::storage::{InviteeRepository, RepositoryError, Result};

/// Invitee operations, including check-in and guest insights.
#[derive(Clone)]
pub struct InviteeService {
    repo: Arc<dyn InviteeRepository>,
}

impl InviteeService {
    pub fn new(repo: Arc<dyn InviteeRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Invitee>> {
        self.repo.find_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Invitee>> {
        self.repo.find_by_id(id).await
    }

    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Invitee>> {
        self.repo.find_by_event_id(event_id).await
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Invitee>> {
        self.repo.find_by_user_id(user_id).await
    }

    pub async fn create(&self, invitee: NewInvitee) -> Result<Invitee> {
        let invitee = self.repo.create(invitee).await?;
        tracing::info!(
            invitee_id = %invitee.id,
            event_id = %invitee.event_id,
            user_id = %invitee.user_id,
            "Invited user to event"
        );
        Ok(invitee)
    }

    pub async fn update(&self, id: Uuid, patch: InviteePatch) -> Result<Option<Invitee>> {
        self.repo.update(id, patch).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await
    }

    /// Sets the RSVP status. Fails with `NotFound` for an unknown id.
    pub async fn update_status(&self, id: Uuid, status: InviteeStatus) -> Result<Invitee> {
        let invitee = self.repo.update_status(id, status).await?;
        tracing::info!(invitee_id = %id, status = %status, "Updated invitee status");
        Ok(invitee)
    }

    /// Marks the invitee as checked in now. Fails with `NotFound` for an
    /// unknown id.
    pub async fn check_in(&self, id: Uuid) -> Result<Invitee> {
        let invitee = self
            .repo
            .update(id, InviteePatch::check_in(timestamp_now()))
            .await?
            .ok_or_else(|| RepositoryError::not_found("Invitee", id))?;
        tracing::info!(invitee_id = %id, "Checked in invitee");
        Ok(invitee)
    }

    /// Aggregates attendance counters for one event.
    pub async fn guest_insights(&self, event_id: Uuid) -> Result<GuestInsights> {
        let invitees = self.repo.find_by_event_id(event_id).await?;
        Ok(guest_insights(&invitees))
    }
}
