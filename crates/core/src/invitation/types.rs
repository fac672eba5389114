use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationError;

/// Base URL of the check-in tokens handed out to invitees.
pub const CHECK_IN_BASE_URL: &str = "https://example.com/qr";

/// Returns the check-in token for an invitee id.
///
/// The token is deterministic: the same id always yields the same token, so
/// every backend generates identical values.
pub fn check_in_token(invitee_id: Uuid) -> String {
    format!("{CHECK_IN_BASE_URL}/{invitee_id}")
}

/// Current time truncated to millisecond precision.
///
/// Every store round-trips milliseconds, so timestamps created through this
/// function compare equal after being read back from any backend.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Role granted to a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Public,
    Tourist,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Public => "public",
            UserRole::Tourist => "tourist",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "public" => Ok(UserRole::Public),
            "tourist" => Ok(UserRole::Tourist),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

/// RSVP state of an invitee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteeStatus {
    #[default]
    Pending,
    Accept,
    Maybe,
    No,
    Busy,
}

impl InviteeStatus {
    pub const ALL: [InviteeStatus; 5] = [
        InviteeStatus::Pending,
        InviteeStatus::Accept,
        InviteeStatus::Maybe,
        InviteeStatus::No,
        InviteeStatus::Busy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InviteeStatus::Pending => "pending",
            InviteeStatus::Accept => "accept",
            InviteeStatus::Maybe => "maybe",
            InviteeStatus::No => "no",
            InviteeStatus::Busy => "busy",
        }
    }
}

impl fmt::Display for InviteeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InviteeStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InviteeStatus::Pending),
            "accept" => Ok(InviteeStatus::Accept),
            "maybe" => Ok(InviteeStatus::Maybe),
            "no" => Ok(InviteeStatus::No),
            "busy" => Ok(InviteeStatus::Busy),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Bcrypt hash. Never serialized into responses.
    #[serde(default, skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An event owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    /// The user that created the event.
    pub user_id: Uuid,
    pub event_name: String,
    pub event_datetime: DateTime<Utc>,
    pub event_location: String,
    pub event_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user invited to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: InviteeStatus,
    /// Check-in token presented at the door.
    pub qr_code: String,
    pub is_checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
