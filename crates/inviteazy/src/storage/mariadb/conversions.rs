//! MariaDB row conversion functions.
//!
//! Ids come back as `CHAR(36)` strings and timestamps as naive UTC values.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::Row;
use uuid::Uuid;

use inviteazy_core::invitation::{Event, Invitee, User};
use inviteazy_core::storage::{RepositoryError, Result};

use crate::storage::sql_error::map_column_error;
use crate::storage::stored::{parse_role, parse_status};

fn get_uuid(row: &MySqlRow, column: &str, entity_type: &'static str) -> Result<Uuid> {
    let value: String = row
        .try_get(column)
        .map_err(|e| map_column_error(e, entity_type))?;
    Uuid::parse_str(&value).map_err(|e| {
        tracing::error!(entity = entity_type, column, error = %e, "Stored id is not a UUID");
        RepositoryError::InvalidData(format!("{entity_type} {column} is not a UUID"))
    })
}

fn get_datetime(row: &MySqlRow, column: &str, entity_type: &'static str) -> Result<DateTime<Utc>> {
    row.try_get::<NaiveDateTime, _>(column)
        .map(|value| value.and_utc())
        .map_err(|e| map_column_error(e, entity_type))
}

/// Convert a row to a User.
pub fn row_to_user(row: &MySqlRow) -> Result<User> {
    let get = |e| map_column_error(e, "User");
    let role: String = row.try_get("role").map_err(get)?;

    Ok(User {
        id: get_uuid(row, "id", "User")?,
        name: row.try_get("name").map_err(get)?,
        email: row.try_get("email").map_err(get)?,
        password: row.try_get("password").map_err(get)?,
        role: parse_role(&role)?,
        phone_number: row.try_get("phone_number").map_err(get)?,
        profile_picture: row.try_get("profile_picture").map_err(get)?,
        address: row.try_get("address").map_err(get)?,
        created_at: get_datetime(row, "created_at", "User")?,
    })
}

/// Convert a row to an Event.
pub fn row_to_event(row: &MySqlRow) -> Result<Event> {
    let get = |e| map_column_error(e, "Event");

    Ok(Event {
        id: get_uuid(row, "id", "Event")?,
        user_id: get_uuid(row, "user_id", "Event")?,
        event_name: row.try_get("event_name").map_err(get)?,
        event_datetime: get_datetime(row, "event_datetime", "Event")?,
        event_location: row.try_get("event_location").map_err(get)?,
        event_description: row.try_get("event_description").map_err(get)?,
        created_at: get_datetime(row, "created_at", "Event")?,
        updated_at: get_datetime(row, "updated_at", "Event")?,
    })
}

/// Convert a row to an Invitee.
pub fn row_to_invitee(row: &MySqlRow) -> Result<Invitee> {
    let get = |e| map_column_error(e, "Invitee");
    let status: String = row.try_get("status").map_err(get)?;
    let checked_in_at: Option<NaiveDateTime> = row.try_get("checked_in_at").map_err(get)?;

    Ok(Invitee {
        id: get_uuid(row, "id", "Invitee")?,
        event_id: get_uuid(row, "event_id", "Invitee")?,
        user_id: get_uuid(row, "user_id", "Invitee")?,
        status: parse_status(&status)?,
        qr_code: row.try_get("qr_code").map_err(get)?,
        is_checked_in: row.try_get("is_checked_in").map_err(get)?,
        checked_in_at: checked_in_at.map(|value| value.and_utc()),
        created_at: get_datetime(row, "created_at", "Invitee")?,
    })
}
