//! PostgreSQL row conversion functions.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use inviteazy_core::invitation::{Event, Invitee, User};
use inviteazy_core::storage::Result;

use crate::storage::sql_error::map_column_error;
use crate::storage::stored::{parse_role, parse_status};

/// Convert a row to a User.
///
/// Expected columns: id, name, email, password, role, phone_number,
/// profile_picture, address, created_at
pub fn row_to_user(row: &PgRow) -> Result<User> {
    let get = |e| map_column_error(e, "User");
    let role: String = row.try_get("role").map_err(get)?;

    Ok(User {
        id: row.try_get::<Uuid, _>("id").map_err(get)?,
        name: row.try_get("name").map_err(get)?,
        email: row.try_get("email").map_err(get)?,
        password: row.try_get("password").map_err(get)?,
        role: parse_role(&role)?,
        phone_number: row.try_get("phone_number").map_err(get)?,
        profile_picture: row.try_get("profile_picture").map_err(get)?,
        address: row.try_get("address").map_err(get)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(get)?,
    })
}

/// Convert a row to an Event.
///
/// Expected columns: id, user_id, event_name, event_datetime, event_location,
/// event_description, created_at, updated_at
pub fn row_to_event(row: &PgRow) -> Result<Event> {
    let get = |e| map_column_error(e, "Event");

    Ok(Event {
        id: row.try_get("id").map_err(get)?,
        user_id: row.try_get("user_id").map_err(get)?,
        event_name: row.try_get("event_name").map_err(get)?,
        event_datetime: row.try_get("event_datetime").map_err(get)?,
        event_location: row.try_get("event_location").map_err(get)?,
        event_description: row.try_get("event_description").map_err(get)?,
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
    })
}

/// Convert a row to an Invitee.
///
/// Expected columns: id, event_id, user_id, status, qr_code, is_checked_in,
/// checked_in_at, created_at
pub fn row_to_invitee(row: &PgRow) -> Result<Invitee> {
    let get = |e| map_column_error(e, "Invitee");
    let status: String = row.try_get("status").map_err(get)?;

    Ok(Invitee {
        id: row.try_get("id").map_err(get)?,
        event_id: row.try_get("event_id").map_err(get)?,
        user_id: row.try_get("user_id").map_err(get)?,
        status: parse_status(&status)?,
        qr_code: row.try_get("qr_code").map_err(get)?,
        is_checked_in: row.try_get("is_checked_in").map_err(get)?,
        checked_in_at: row.try_get("checked_in_at").map_err(get)?,
        created_at: row.try_get("created_at").map_err(get)?,
    })
}
