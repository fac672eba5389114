//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and domain types.
//! Data attributes use the same names as the JSON representation.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use inviteazy_core::invitation::{Event, EventPatch, Invitee, InviteePatch, User, UserPatch};
use inviteazy_core::storage::RepositoryError;

use super::keys;
use crate::storage::stored::{parse_role, parse_status};

pub type Item = HashMap<String, AttributeValue>;

// ============================================================================
// Entity type constants
// ============================================================================

pub const ENTITY_TYPE_USER: &str = "USER";
pub const ENTITY_TYPE_EMAIL: &str = "EMAIL";
pub const ENTITY_TYPE_EVENT: &str = "EVENT";
pub const ENTITY_TYPE_INVITEE: &str = "INVITEE";

pub fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

fn timestamp(at: DateTime<Utc>) -> AttributeValue {
    s(keys::format_timestamp(at))
}

/// Primary key for an item whose `PK` and `SK` are equal.
pub fn primary_key(pk: String) -> Item {
    HashMap::from([("PK".to_string(), s(pk.clone())), ("SK".to_string(), s(pk))])
}

fn keyed_item(pk: String, entity_type: &str) -> Item {
    let mut item = primary_key(pk);
    item.insert("entityType".to_string(), s(entity_type));
    item
}

// ============================================================================
// User conversions
// ============================================================================

/// Convert a User to DynamoDB item.
pub fn user_to_item(user: &User) -> Item {
    let mut item = keyed_item(keys::user_pk(user.id), ENTITY_TYPE_USER);

    item.insert("id".to_string(), s(user.id.to_string()));
    item.insert("name".to_string(), s(&user.name));
    item.insert("email".to_string(), s(&user.email));
    item.insert("password".to_string(), s(&user.password));
    item.insert("role".to_string(), s(user.role.as_str()));
    if let Some(phone_number) = &user.phone_number {
        item.insert("phone_number".to_string(), s(phone_number));
    }
    if let Some(profile_picture) = &user.profile_picture {
        item.insert("profile_picture".to_string(), s(profile_picture));
    }
    if let Some(address) = &user.address {
        item.insert("address".to_string(), s(address));
    }
    item.insert("created_at".to_string(), timestamp(user.created_at));

    item
}

/// Item reserving an email address for one user.
pub fn email_marker_item(email: &str, user_id: Uuid) -> Item {
    let mut item = keyed_item(keys::email_pk(email), ENTITY_TYPE_EMAIL);
    item.insert("user_id".to_string(), s(user_id.to_string()));
    item
}

/// Reads the owner of an email marker item.
pub fn email_marker_owner(item: &Item) -> Result<Uuid, RepositoryError> {
    get_uuid(item, "user_id")
}

/// Convert a DynamoDB item to User.
pub fn item_to_user(item: &Item) -> Result<User, RepositoryError> {
    Ok(User {
        id: get_uuid(item, "id")?,
        name: get_string(item, "name")?,
        email: get_string(item, "email")?,
        password: get_string(item, "password")?,
        role: parse_role(&get_string(item, "role")?)?,
        phone_number: get_optional_string(item, "phone_number"),
        profile_picture: get_optional_string(item, "profile_picture"),
        address: get_optional_string(item, "address"),
        created_at: get_datetime(item, "created_at")?,
    })
}

// ============================================================================
// Event conversions
// ============================================================================

/// Convert an Event to DynamoDB item.
pub fn event_to_item(event: &Event) -> Item {
    let mut item = keyed_item(keys::event_pk(event.id), ENTITY_TYPE_EVENT);
    item.insert("GSI1PK".to_string(), s(keys::event_gsi1_pk(event.user_id)));
    item.insert(
        "GSI1SK".to_string(),
        s(keys::event_gsi1_sk(event.created_at, event.id)),
    );

    item.insert("id".to_string(), s(event.id.to_string()));
    item.insert("user_id".to_string(), s(event.user_id.to_string()));
    item.insert("event_name".to_string(), s(&event.event_name));
    item.insert("event_datetime".to_string(), timestamp(event.event_datetime));
    item.insert("event_location".to_string(), s(&event.event_location));
    item.insert("event_description".to_string(), s(&event.event_description));
    item.insert("created_at".to_string(), timestamp(event.created_at));
    item.insert("updated_at".to_string(), timestamp(event.updated_at));

    item
}

/// Convert a DynamoDB item to Event.
pub fn item_to_event(item: &Item) -> Result<Event, RepositoryError> {
    Ok(Event {
        id: get_uuid(item, "id")?,
        user_id: get_uuid(item, "user_id")?,
        event_name: get_string(item, "event_name")?,
        event_datetime: get_datetime(item, "event_datetime")?,
        event_location: get_string(item, "event_location")?,
        event_description: get_optional_string(item, "event_description").unwrap_or_default(),
        created_at: get_datetime(item, "created_at")?,
        updated_at: get_datetime(item, "updated_at")?,
    })
}

// ============================================================================
// Invitee conversions
// ============================================================================

/// Convert an Invitee to DynamoDB item.
pub fn invitee_to_item(invitee: &Invitee) -> Item {
    let mut item = keyed_item(keys::invitee_pk(invitee.id), ENTITY_TYPE_INVITEE);
    let index_sk = keys::invitee_index_sk(invitee.created_at, invitee.id);
    item.insert(
        "GSI1PK".to_string(),
        s(keys::invitee_gsi1_pk(invitee.event_id)),
    );
    item.insert("GSI1SK".to_string(), s(index_sk.clone()));
    item.insert(
        "GSI2PK".to_string(),
        s(keys::invitee_gsi2_pk(invitee.user_id)),
    );
    item.insert("GSI2SK".to_string(), s(index_sk));

    item.insert("id".to_string(), s(invitee.id.to_string()));
    item.insert("event_id".to_string(), s(invitee.event_id.to_string()));
    item.insert("user_id".to_string(), s(invitee.user_id.to_string()));
    item.insert("status".to_string(), s(invitee.status.as_str()));
    item.insert("qr_code".to_string(), s(&invitee.qr_code));
    item.insert(
        "is_checked_in".to_string(),
        AttributeValue::Bool(invitee.is_checked_in),
    );
    if let Some(checked_in_at) = invitee.checked_in_at {
        item.insert("checked_in_at".to_string(), timestamp(checked_in_at));
    }
    item.insert("created_at".to_string(), timestamp(invitee.created_at));

    item
}

/// Convert a DynamoDB item to Invitee.
pub fn item_to_invitee(item: &Item) -> Result<Invitee, RepositoryError> {
    Ok(Invitee {
        id: get_uuid(item, "id")?,
        event_id: get_uuid(item, "event_id")?,
        user_id: get_uuid(item, "user_id")?,
        status: parse_status(&get_string(item, "status")?)?,
        qr_code: get_string(item, "qr_code")?,
        is_checked_in: get_bool(item, "is_checked_in")?,
        checked_in_at: get_optional_datetime(item, "checked_in_at")?,
        created_at: get_datetime(item, "created_at")?,
    })
}

// ============================================================================
// Update expressions
// ============================================================================

/// A `SET` update expression with placeholder names and values.
///
/// Every attribute goes through a name placeholder because `name`, `status`
/// and `role` are DynamoDB reserved words.
#[derive(Debug, Default)]
pub struct UpdateExpression {
    clauses: Vec<String>,
    names: HashMap<String, String>,
    values: Item,
}

impl UpdateExpression {
    pub fn set(mut self, attribute: &str, value: AttributeValue) -> Self {
        let index = self.clauses.len();
        self.clauses.push(format!("#a{index} = :v{index}"));
        self.names.insert(format!("#a{index}"), attribute.to_string());
        self.values.insert(format!(":v{index}"), value);
        self
    }

    fn set_if<T>(self, attribute: &str, value: Option<T>, f: impl FnOnce(T) -> AttributeValue) -> Self {
        match value {
            Some(value) => self.set(attribute, f(value)),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the expression, its attribute names, and its attribute values.
    pub fn into_parts(self) -> (String, HashMap<String, String>, Item) {
        (
            format!("SET {}", self.clauses.join(", ")),
            self.names,
            self.values,
        )
    }
}

pub fn user_patch_update(patch: &UserPatch) -> UpdateExpression {
    UpdateExpression::default()
        .set_if("name", patch.name.as_deref(), s)
        .set_if("email", patch.email.as_deref(), s)
        .set_if("password", patch.password.as_deref(), s)
        .set_if("role", patch.role, |role| s(role.as_str()))
        .set_if("phone_number", patch.phone_number.as_deref(), s)
        .set_if("profile_picture", patch.profile_picture.as_deref(), s)
        .set_if("address", patch.address.as_deref(), s)
}

pub fn event_patch_update(patch: &EventPatch, updated_at: DateTime<Utc>) -> UpdateExpression {
    UpdateExpression::default()
        .set_if("event_name", patch.event_name.as_deref(), s)
        .set_if("event_datetime", patch.event_datetime, timestamp)
        .set_if("event_location", patch.event_location.as_deref(), s)
        .set_if("event_description", patch.event_description.as_deref(), s)
        .set("updated_at", timestamp(updated_at))
}

/// Moving an invitee to another event or user also moves its index keys.
pub fn invitee_patch_update(patch: &InviteePatch) -> UpdateExpression {
    UpdateExpression::default()
        .set_if("event_id", patch.event_id, |id| s(id.to_string()))
        .set_if("GSI1PK", patch.event_id, |id| s(keys::invitee_gsi1_pk(id)))
        .set_if("user_id", patch.user_id, |id| s(id.to_string()))
        .set_if("GSI2PK", patch.user_id, |id| s(keys::invitee_gsi2_pk(id)))
        .set_if("status", patch.status, |status| s(status.as_str()))
        .set_if("qr_code", patch.qr_code.as_deref(), s)
        .set_if("is_checked_in", patch.is_checked_in, AttributeValue::Bool)
        .set_if("checked_in_at", patch.checked_in_at, timestamp)
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get a required string attribute.
fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get an optional string attribute.
fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

/// Get a required boolean attribute.
fn get_bool(item: &Item, key: &str) -> Result<bool, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get a required UUID attribute.
fn get_uuid(item: &Item, key: &str) -> Result<Uuid, RepositoryError> {
    let s = get_string(item, key)?;
    Uuid::parse_str(&s)
        .map_err(|e| {
            tracing::error!(key, error = %e, "Stored id is not a UUID");
            RepositoryError::InvalidData(format!("Invalid UUID {}", key))
        })
}

fn parse_datetime(value: &str, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            tracing::error!(key, error = %e, "Stored timestamp is not RFC 3339");
            RepositoryError::InvalidData(format!("Invalid datetime {}", key))
        })
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    parse_datetime(&get_string(item, key)?, key)
}

fn get_optional_datetime(item: &Item, key: &str) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    get_optional_string(item, key)
        .map(|value| parse_datetime(&value, key))
        .transpose()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use inviteazy_core::invitation::{InviteeStatus, NewEvent, NewInvitee, NewUser, UserRole};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 30, 0).unwrap()
    }

    fn sample_user() -> User {
        NewUser {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            password: "hashed".to_string(),
            role: UserRole::Tourist,
            phone_number: Some("+855 12 345 678".to_string()),
            profile_picture: None,
            address: None,
        }
        .into_user(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap(),
            at(10),
        )
    }

    fn sample_event() -> Event {
        NewEvent {
            user_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap(),
            event_name: "Standup".to_string(),
            event_datetime: at(9),
            event_location: "Zoom".to_string(),
            event_description: String::new(),
        }
        .into_event(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap(),
            at(8),
        )
    }

    fn sample_invitee() -> Invitee {
        NewInvitee::new(sample_event().id, sample_user().id).into_invitee(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap(),
            at(11),
        )
    }

    #[test]
    fn test_user_round_trip() {
        let user = sample_user();
        let item = user_to_item(&user);

        assert_eq!(item_to_user(&item).unwrap(), user);
        assert!(!item.contains_key("profile_picture"));
    }

    #[test]
    fn test_user_item_has_correct_keys() {
        let item = user_to_item(&sample_user());

        assert_eq!(
            item.get("PK").unwrap().as_s().unwrap(),
            "USER#550e8400-e29b-41d4-a716-446655440001"
        );
        assert_eq!(item.get("SK"), item.get("PK"));
        assert_eq!(item.get("entityType").unwrap().as_s().unwrap(), "USER");
    }

    #[test]
    fn test_email_marker_points_at_user() {
        let user = sample_user();
        let item = email_marker_item(&user.email, user.id);

        assert_eq!(
            item.get("PK").unwrap().as_s().unwrap(),
            "EMAIL#john@example.com"
        );
        assert_eq!(email_marker_owner(&item).unwrap(), user.id);
    }

    #[test]
    fn test_event_round_trip_and_owner_index() {
        let event = sample_event();
        let item = event_to_item(&event);

        assert_eq!(item_to_event(&item).unwrap(), event);
        assert_eq!(
            item.get("GSI1PK").unwrap().as_s().unwrap(),
            "USER#550e8400-e29b-41d4-a716-446655440001"
        );
        assert!(item
            .get("GSI1SK")
            .unwrap()
            .as_s()
            .unwrap()
            .starts_with("EVENT#2024-01-15T08:30:00.000Z#"));
    }

    #[test]
    fn test_invitee_round_trip_and_indexes() {
        let mut invitee = sample_invitee();
        invitee.status = InviteeStatus::Busy;
        invitee.is_checked_in = true;
        invitee.checked_in_at = Some(at(12));
        let item = invitee_to_item(&invitee);

        assert_eq!(item_to_invitee(&item).unwrap(), invitee);
        assert_eq!(
            item.get("GSI1PK").unwrap().as_s().unwrap(),
            "EVENT#550e8400-e29b-41d4-a716-446655440002"
        );
        assert_eq!(
            item.get("GSI2PK").unwrap().as_s().unwrap(),
            "USER#550e8400-e29b-41d4-a716-446655440001"
        );
        assert_eq!(item.get("GSI1SK"), item.get("GSI2SK"));
    }

    #[test]
    fn test_unknown_status_is_invalid_data() {
        let mut item = invitee_to_item(&sample_invitee());
        item.insert("status".to_string(), s("later"));

        assert!(matches!(
            item_to_invitee(&item),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_malformed_timestamp_names_only_the_field() {
        let mut item = invitee_to_item(&sample_invitee());
        item.insert("created_at".to_string(), s("yesterday at noon"));

        assert_eq!(
            item_to_invitee(&item),
            Err(RepositoryError::InvalidData(
                "Invalid datetime created_at".to_string()
            ))
        );
    }

    #[test]
    fn test_update_expression_uses_placeholders() {
        let (expression, names, values) = user_patch_update(&UserPatch {
            name: Some("Ana".to_string()),
            role: Some(UserRole::Admin),
            ..UserPatch::default()
        })
        .into_parts();

        assert_eq!(expression, "SET #a0 = :v0, #a1 = :v1");
        assert_eq!(names.get("#a0").map(String::as_str), Some("name"));
        assert_eq!(names.get("#a1").map(String::as_str), Some("role"));
        assert_eq!(values.get(":v1"), Some(&s("admin")));
    }

    #[test]
    fn test_empty_user_patch_has_no_clauses() {
        assert!(user_patch_update(&UserPatch::default()).is_empty());
        assert!(!event_patch_update(&EventPatch::default(), at(1)).is_empty());
    }

    #[test]
    fn test_moving_invitee_updates_index_partition() {
        let event_id = Uuid::new_v4();
        let (_, names, values) = invitee_patch_update(&InviteePatch {
            event_id: Some(event_id),
            ..InviteePatch::default()
        })
        .into_parts();

        assert_eq!(names.len(), 2);
        assert!(names.values().any(|name| name == "GSI1PK"));
        assert!(values
            .values()
            .any(|value| value == &s(keys::invitee_gsi1_pk(event_id))));
    }

    #[test]
    fn test_get_string_missing_field() {
        let item = HashMap::new();
        assert!(get_string(&item, "missing").is_err());
    }
}
