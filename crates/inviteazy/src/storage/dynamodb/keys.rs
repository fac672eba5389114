//! DynamoDB key generation functions.
//!
//! Pure functions for the single-table layout. Every entity item uses the
//! same value for `PK` and `SK`.
//!
//! | Item          | PK / SK            | GSI1PK           | GSI1SK                   | GSI2PK         |
//! |---------------|--------------------|------------------|--------------------------|----------------|
//! | User          | `USER#<id>`        |                  |                          |                |
//! | Email marker  | `EMAIL#<email>`    |                  |                          |                |
//! | Event         | `EVENT#<id>`       | `USER#<owner>`   | `EVENT#<created>#<id>`   |                |
//! | Invitee       | `INVITEE#<id>`     | `EVENT#<event>`  | `INVITEE#<created>#<id>` | `USER#<user>`  |

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

// ============================================================================
// Key prefixes
// ============================================================================

pub const USER_PREFIX: &str = "USER#";
pub const EMAIL_PREFIX: &str = "EMAIL#";
pub const EVENT_PREFIX: &str = "EVENT#";
pub const INVITEE_PREFIX: &str = "INVITEE#";

/// Formats a timestamp so that lexicographic order matches time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// User keys
// ============================================================================

/// Pattern: `USER#<user_id>`
pub fn user_pk(user_id: Uuid) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Key of the item that reserves an email address.
///
/// Pattern: `EMAIL#<email>`
pub fn email_pk(email: &str) -> String {
    format!("{EMAIL_PREFIX}{email}")
}

// ============================================================================
// Event keys
// ============================================================================

/// Pattern: `EVENT#<event_id>`
pub fn event_pk(event_id: Uuid) -> String {
    format!("{EVENT_PREFIX}{event_id}")
}

/// GSI1 partition for the events a user owns.
///
/// Pattern: `USER#<user_id>`
pub fn event_gsi1_pk(owner_id: Uuid) -> String {
    user_pk(owner_id)
}

/// Pattern: `EVENT#<created_at>#<event_id>`
pub fn event_gsi1_sk(created_at: DateTime<Utc>, event_id: Uuid) -> String {
    format!("{EVENT_PREFIX}{}#{event_id}", format_timestamp(created_at))
}

// ============================================================================
// Invitee keys
// ============================================================================

/// Pattern: `INVITEE#<invitee_id>`
pub fn invitee_pk(invitee_id: Uuid) -> String {
    format!("{INVITEE_PREFIX}{invitee_id}")
}

/// GSI1 partition for the invitees of an event.
///
/// Pattern: `EVENT#<event_id>`
pub fn invitee_gsi1_pk(event_id: Uuid) -> String {
    event_pk(event_id)
}

/// GSI2 partition for the invitations of a user.
///
/// Pattern: `USER#<user_id>`
pub fn invitee_gsi2_pk(user_id: Uuid) -> String {
    user_pk(user_id)
}

/// Sort key shared by both invitee indexes.
///
/// Pattern: `INVITEE#<created_at>#<invitee_id>`
pub fn invitee_index_sk(created_at: DateTime<Utc>, invitee_id: Uuid) -> String {
    format!("{INVITEE_PREFIX}{}#{invitee_id}", format_timestamp(created_at))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn id() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap()
    }

    #[test]
    fn test_entity_keys() {
        assert_eq!(user_pk(id()), "USER#550e8400-e29b-41d4-a716-446655440001");
        assert_eq!(event_pk(id()), "EVENT#550e8400-e29b-41d4-a716-446655440001");
        assert_eq!(
            invitee_pk(id()),
            "INVITEE#550e8400-e29b-41d4-a716-446655440001"
        );
        assert_eq!(email_pk("ana@example.com"), "EMAIL#ana@example.com");
    }

    #[test]
    fn test_index_partitions_reuse_owner_keys() {
        assert_eq!(event_gsi1_pk(id()), user_pk(id()));
        assert_eq!(invitee_gsi1_pk(id()), event_pk(id()));
        assert_eq!(invitee_gsi2_pk(id()), user_pk(id()));
    }

    #[test]
    fn test_index_sort_keys_embed_millisecond_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
        assert_eq!(
            event_gsi1_sk(at, id()),
            "EVENT#2024-06-15T09:30:00.000Z#550e8400-e29b-41d4-a716-446655440001"
        );
        assert_eq!(
            invitee_index_sk(at, id()),
            "INVITEE#2024-06-15T09:30:00.000Z#550e8400-e29b-41d4-a716-446655440001"
        );
    }

    #[test]
    fn test_sort_keys_order_by_time() {
        let earlier = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        assert!(invitee_index_sk(earlier, id()) < invitee_index_sk(later, Uuid::nil()));
    }
}
