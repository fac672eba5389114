//! Input types for creating and patching entities.
//!
//! `New*` types carry everything the caller supplies; the repository fills in
//! ids, timestamps and defaults. `*Patch` types are partial updates where a
//! `None` field leaves the stored value untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{check_in_token, Event, Invitee, InviteeStatus, User, UserRole};

/// Payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Plain text on the way in; the service layer swaps it for a hash before
    /// it reaches a repository.
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewUser {
    /// Materializes the user with a store-assigned id and creation time.
    pub fn into_user(self, id: Uuid, created_at: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            role: self.role,
            phone_number: self.phone_number,
            profile_picture: self.profile_picture,
            address: self.address,
            created_at,
        }
    }
}

/// Partial update of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(phone_number) = self.phone_number {
            user.phone_number = Some(phone_number);
        }
        if let Some(profile_picture) = self.profile_picture {
            user.profile_picture = Some(profile_picture);
        }
        if let Some(address) = self.address {
            user.address = Some(address);
        }
    }
}

/// Payload for creating an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub user_id: Uuid,
    pub event_name: String,
    pub event_datetime: DateTime<Utc>,
    pub event_location: String,
    #[serde(default)]
    pub event_description: String,
}

impl NewEvent {
    /// Materializes the event. `updated_at` starts equal to `created_at`.
    pub fn into_event(self, id: Uuid, created_at: DateTime<Utc>) -> Event {
        Event {
            id,
            user_id: self.user_id,
            event_name: self.event_name,
            event_datetime: self.event_datetime,
            event_location: self.event_location,
            event_description: self.event_description,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Partial update of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_description: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the patch and bumps `updated_at`.
    pub fn apply_to(self, event: &mut Event, updated_at: DateTime<Utc>) {
        if let Some(event_name) = self.event_name {
            event.event_name = event_name;
        }
        if let Some(event_datetime) = self.event_datetime {
            event.event_datetime = event_datetime;
        }
        if let Some(event_location) = self.event_location {
            event.event_location = event_location;
        }
        if let Some(event_description) = self.event_description {
            event.event_description = event_description;
        }
        event.updated_at = updated_at;
    }
}

/// Payload for inviting a user to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvitee {
    pub event_id: Uuid,
    pub user_id: Uuid,
    /// Defaults to `pending`.
    #[serde(default)]
    pub status: Option<InviteeStatus>,
    /// Defaults to the generated check-in token for the new id.
    #[serde(default)]
    pub qr_code: Option<String>,
}

impl NewInvitee {
    pub fn new(event_id: Uuid, user_id: Uuid) -> Self {
        Self {
            event_id,
            user_id,
            status: None,
            qr_code: None,
        }
    }

    pub fn with_status(mut self, status: InviteeStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Materializes the invitee, filling the defaulted fields.
    pub fn into_invitee(self, id: Uuid, created_at: DateTime<Utc>) -> Invitee {
        Invitee {
            id,
            event_id: self.event_id,
            user_id: self.user_id,
            status: self.status.unwrap_or_default(),
            qr_code: self.qr_code.unwrap_or_else(|| check_in_token(id)),
            is_checked_in: false,
            checked_in_at: None,
            created_at,
        }
    }
}

/// Partial update of an invitee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InviteeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checked_in: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl InviteePatch {
    /// Patch that marks an invitee as checked in at the given time.
    pub fn check_in(at: DateTime<Utc>) -> Self {
        Self {
            is_checked_in: Some(true),
            checked_in_at: Some(at),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(self, invitee: &mut Invitee) {
        if let Some(event_id) = self.event_id {
            invitee.event_id = event_id;
        }
        if let Some(user_id) = self.user_id {
            invitee.user_id = user_id;
        }
        if let Some(status) = self.status {
            invitee.status = status;
        }
        if let Some(qr_code) = self.qr_code {
            invitee.qr_code = qr_code;
        }
        if let Some(is_checked_in) = self.is_checked_in {
            invitee.is_checked_in = is_checked_in;
        }
        if let Some(checked_in_at) = self.checked_in_at {
            invitee.checked_in_at = Some(checked_in_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::invitation::timestamp_now;

    #[test]
    fn test_new_invitee_defaults() {
        let id = Uuid::new_v4();
        let now = timestamp_now();
        let invitee = NewInvitee::new(Uuid::new_v4(), Uuid::new_v4()).into_invitee(id, now);

        assert_eq!(invitee.status, InviteeStatus::Pending);
        assert_eq!(invitee.qr_code, format!("https://example.com/qr/{id}"));
        assert!(!invitee.is_checked_in);
        assert_eq!(invitee.checked_in_at, None);
        assert_eq!(invitee.created_at, now);
    }

    #[test]
    fn test_new_invitee_keeps_supplied_values() {
        let invitee = NewInvitee {
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: Some(InviteeStatus::Maybe),
            qr_code: Some("custom-token".to_string()),
        }
        .into_invitee(Uuid::new_v4(), timestamp_now());

        assert_eq!(invitee.status, InviteeStatus::Maybe);
        assert_eq!(invitee.qr_code, "custom-token");
    }

    #[test]
    fn test_new_invitee_deserializes_without_optional_fields() {
        let event_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let json = format!(r#"{{"event_id":"{event_id}","user_id":"{user_id}"}}"#);

        let new: NewInvitee = serde_json::from_str(&json).unwrap();
        assert_eq!(new, NewInvitee::new(event_id, user_id));
    }

    #[test]
    fn test_event_patch_bumps_updated_at() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap();
        let mut event = NewEvent {
            user_id: Uuid::new_v4(),
            event_name: "Launch".to_string(),
            event_datetime: created,
            event_location: "Hall A".to_string(),
            event_description: String::new(),
        }
        .into_event(Uuid::new_v4(), created);

        EventPatch {
            event_location: Some("Hall B".to_string()),
            ..EventPatch::default()
        }
        .apply_to(&mut event, later);

        assert_eq!(event.event_name, "Launch");
        assert_eq!(event.event_location, "Hall B");
        assert_eq!(event.created_at, created);
        assert_eq!(event.updated_at, later);
    }

    #[test]
    fn test_check_in_patch() {
        let at = timestamp_now();
        let mut invitee =
            NewInvitee::new(Uuid::new_v4(), Uuid::new_v4()).into_invitee(Uuid::new_v4(), at);

        InviteePatch::check_in(at).apply_to(&mut invitee);

        assert!(invitee.is_checked_in);
        assert_eq!(invitee.checked_in_at, Some(at));
        assert_eq!(invitee.status, InviteeStatus::Pending);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(UserPatch::default().is_empty());
        assert!(EventPatch::default().is_empty());
        assert!(!InviteePatch::check_in(timestamp_now()).is_empty());
    }

    #[test]
    fn test_user_patch_leaves_unset_fields() {
        let mut user = NewUser {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "hash".to_string(),
            role: UserRole::Admin,
            phone_number: Some("555-0100".to_string()),
            profile_picture: None,
            address: None,
        }
        .into_user(Uuid::new_v4(), timestamp_now());

        UserPatch {
            address: Some("1 Main St".to_string()),
            ..UserPatch::default()
        }
        .apply_to(&mut user);

        assert_eq!(user.name, "Ana");
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.phone_number.as_deref(), Some("555-0100"));
        assert_eq!(user.address.as_deref(), Some("1 Main St"));
    }
}
