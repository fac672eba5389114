//! Stored document shapes and conversions to domain types.
//!
//! Ids are stored as UUID strings in `_id`. Timestamps are BSON dates, which
//! hold milliseconds.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use inviteazy_core::invitation::{
    Event, EventPatch, Invitee, InviteePatch, User, UserPatch,
};
use inviteazy_core::storage::{RepositoryError, Result};

use crate::storage::stored::{parse_role, parse_status};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub address: Option<String>,
    pub created_at: bson::DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub event_name: String,
    pub event_datetime: bson::DateTime,
    pub event_location: String,
    pub event_description: String,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteeDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub status: String,
    pub qr_code: String,
    pub is_checked_in: bool,
    pub checked_in_at: Option<bson::DateTime>,
    pub created_at: bson::DateTime,
}

pub fn to_bson_datetime(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

fn from_bson_datetime(value: bson::DateTime, field: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value.timestamp_millis())
        .ok_or_else(|| RepositoryError::InvalidData(format!("{field} is out of range")))
}

fn parse_uuid(value: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| {
            tracing::error!(field, error = %e, "Stored id is not a UUID");
            RepositoryError::InvalidData(format!("{field} is not a UUID"))
        })
}

// ============================================================================
// Domain → document
// ============================================================================

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            role: user.role.as_str().to_string(),
            phone_number: user.phone_number.clone(),
            profile_picture: user.profile_picture.clone(),
            address: user.address.clone(),
            created_at: to_bson_datetime(user.created_at),
        }
    }
}

impl From<&Event> for EventDocument {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            user_id: event.user_id.to_string(),
            event_name: event.event_name.clone(),
            event_datetime: to_bson_datetime(event.event_datetime),
            event_location: event.event_location.clone(),
            event_description: event.event_description.clone(),
            created_at: to_bson_datetime(event.created_at),
            updated_at: to_bson_datetime(event.updated_at),
        }
    }
}

impl From<&Invitee> for InviteeDocument {
    fn from(invitee: &Invitee) -> Self {
        Self {
            id: invitee.id.to_string(),
            event_id: invitee.event_id.to_string(),
            user_id: invitee.user_id.to_string(),
            status: invitee.status.as_str().to_string(),
            qr_code: invitee.qr_code.clone(),
            is_checked_in: invitee.is_checked_in,
            checked_in_at: invitee.checked_in_at.map(to_bson_datetime),
            created_at: to_bson_datetime(invitee.created_at),
        }
    }
}

// ============================================================================
// Document → domain
// ============================================================================

impl TryFrom<UserDocument> for User {
    type Error = RepositoryError;

    fn try_from(doc: UserDocument) -> Result<Self> {
        Ok(User {
            id: parse_uuid(&doc.id, "User _id")?,
            role: parse_role(&doc.role)?,
            created_at: from_bson_datetime(doc.created_at, "User created_at")?,
            name: doc.name,
            email: doc.email,
            password: doc.password,
            phone_number: doc.phone_number,
            profile_picture: doc.profile_picture,
            address: doc.address,
        })
    }
}

impl TryFrom<EventDocument> for Event {
    type Error = RepositoryError;

    fn try_from(doc: EventDocument) -> Result<Self> {
        Ok(Event {
            id: parse_uuid(&doc.id, "Event _id")?,
            user_id: parse_uuid(&doc.user_id, "Event user_id")?,
            event_datetime: from_bson_datetime(doc.event_datetime, "Event event_datetime")?,
            created_at: from_bson_datetime(doc.created_at, "Event created_at")?,
            updated_at: from_bson_datetime(doc.updated_at, "Event updated_at")?,
            event_name: doc.event_name,
            event_location: doc.event_location,
            event_description: doc.event_description,
        })
    }
}

impl TryFrom<InviteeDocument> for Invitee {
    type Error = RepositoryError;

    fn try_from(doc: InviteeDocument) -> Result<Self> {
        Ok(Invitee {
            id: parse_uuid(&doc.id, "Invitee _id")?,
            event_id: parse_uuid(&doc.event_id, "Invitee event_id")?,
            user_id: parse_uuid(&doc.user_id, "Invitee user_id")?,
            status: parse_status(&doc.status)?,
            checked_in_at: doc
                .checked_in_at
                .map(|at| from_bson_datetime(at, "Invitee checked_in_at"))
                .transpose()?,
            created_at: from_bson_datetime(doc.created_at, "Invitee created_at")?,
            qr_code: doc.qr_code,
            is_checked_in: doc.is_checked_in,
        })
    }
}

// ============================================================================
// Patches → `$set` documents
// ============================================================================

pub fn user_patch_to_set(patch: &UserPatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = &patch.name {
        set.insert("name", name.as_str());
    }
    if let Some(email) = &patch.email {
        set.insert("email", email.as_str());
    }
    if let Some(password) = &patch.password {
        set.insert("password", password.as_str());
    }
    if let Some(role) = patch.role {
        set.insert("role", role.as_str());
    }
    if let Some(phone_number) = &patch.phone_number {
        set.insert("phone_number", phone_number.as_str());
    }
    if let Some(profile_picture) = &patch.profile_picture {
        set.insert("profile_picture", profile_picture.as_str());
    }
    if let Some(address) = &patch.address {
        set.insert("address", address.as_str());
    }
    set
}

pub fn event_patch_to_set(patch: &EventPatch, updated_at: DateTime<Utc>) -> Document {
    let mut set = Document::new();
    if let Some(event_name) = &patch.event_name {
        set.insert("event_name", event_name.as_str());
    }
    if let Some(event_datetime) = patch.event_datetime {
        set.insert("event_datetime", to_bson_datetime(event_datetime));
    }
    if let Some(event_location) = &patch.event_location {
        set.insert("event_location", event_location.as_str());
    }
    if let Some(event_description) = &patch.event_description {
        set.insert("event_description", event_description.as_str());
    }
    set.insert("updated_at", to_bson_datetime(updated_at));
    set
}

pub fn invitee_patch_to_set(patch: &InviteePatch) -> Document {
    let mut set = Document::new();
    if let Some(event_id) = patch.event_id {
        set.insert("event_id", event_id.to_string());
    }
    if let Some(user_id) = patch.user_id {
        set.insert("user_id", user_id.to_string());
    }
    if let Some(status) = patch.status {
        set.insert("status", status.as_str());
    }
    if let Some(qr_code) = &patch.qr_code {
        set.insert("qr_code", qr_code.as_str());
    }
    if let Some(is_checked_in) = patch.is_checked_in {
        set.insert("is_checked_in", is_checked_in);
    }
    if let Some(checked_in_at) = patch.checked_in_at {
        set.insert("checked_in_at", to_bson_datetime(checked_in_at));
    }
    set
}
