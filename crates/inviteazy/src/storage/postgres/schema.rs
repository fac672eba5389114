//! PostgreSQL schema definitions and SQL query constants.
//!
//! Ids and creation timestamps are assigned by the database. Timestamps are
//! truncated to milliseconds so they match the other backends.

/// Statements that create the schema. Each is idempotent.
pub const CREATE_TABLES: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('admin', 'public', 'tourist')),
    phone_number TEXT,
    profile_picture TEXT,
    address TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT date_trunc('milliseconds', now())
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS events (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    event_name TEXT NOT NULL,
    event_datetime TIMESTAMPTZ NOT NULL,
    event_location TEXT NOT NULL,
    event_description TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT date_trunc('milliseconds', now()),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT date_trunc('milliseconds', now())
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS invitees (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'accept', 'maybe', 'no', 'busy')),
    qr_code TEXT NOT NULL,
    is_checked_in BOOLEAN NOT NULL DEFAULT FALSE,
    checked_in_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT date_trunc('milliseconds', now())
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_events_user_id ON events(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_invitees_event_id ON invitees(event_id)",
    "CREATE INDEX IF NOT EXISTS idx_invitees_user_id ON invitees(user_id)",
];

// User queries
pub const SELECT_USERS: &str = r#"
SELECT id, name, email, password, role, phone_number, profile_picture, address, created_at
FROM users
ORDER BY created_at, id
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, name, email, password, role, phone_number, profile_picture, address, created_at
FROM users
WHERE id = $1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, name, email, password, role, phone_number, profile_picture, address, created_at
FROM users
WHERE email = $1
"#;

pub const INSERT_USER: &str = r#"
INSERT INTO users (name, email, password, role, phone_number, profile_picture, address)
VALUES ($1, $2, $3, $4, $5, $6, $7)
RETURNING id, name, email, password, role, phone_number, profile_picture, address, created_at
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users SET
    name = COALESCE($2, name),
    email = COALESCE($3, email),
    password = COALESCE($4, password),
    role = COALESCE($5, role),
    phone_number = COALESCE($6, phone_number),
    profile_picture = COALESCE($7, profile_picture),
    address = COALESCE($8, address)
WHERE id = $1
RETURNING id, name, email, password, role, phone_number, profile_picture, address, created_at
"#;

pub const DELETE_USER: &str = "DELETE FROM users WHERE id = $1";

// Event queries
pub const SELECT_EVENTS: &str = r#"
SELECT id, user_id, event_name, event_datetime, event_location, event_description,
       created_at, updated_at
FROM events
ORDER BY created_at, id
"#;

pub const SELECT_EVENTS_BY_USER: &str = r#"
SELECT id, user_id, event_name, event_datetime, event_location, event_description,
       created_at, updated_at
FROM events
WHERE user_id = $1
ORDER BY created_at, id
"#;

pub const SELECT_EVENT_BY_ID: &str = r#"
SELECT id, user_id, event_name, event_datetime, event_location, event_description,
       created_at, updated_at
FROM events
WHERE id = $1
"#;

pub const INSERT_EVENT: &str = r#"
INSERT INTO events (user_id, event_name, event_datetime, event_location, event_description)
VALUES ($1, $2, $3, $4, $5)
RETURNING id, user_id, event_name, event_datetime, event_location, event_description,
          created_at, updated_at
"#;

pub const UPDATE_EVENT: &str = r#"
UPDATE events SET
    event_name = COALESCE($2, event_name),
    event_datetime = COALESCE($3, event_datetime),
    event_location = COALESCE($4, event_location),
    event_description = COALESCE($5, event_description),
    updated_at = date_trunc('milliseconds', now())
WHERE id = $1
RETURNING id, user_id, event_name, event_datetime, event_location, event_description,
          created_at, updated_at
"#;

pub const DELETE_EVENT: &str = "DELETE FROM events WHERE id = $1";

// Invitee queries
pub const SELECT_INVITEES: &str = r#"
SELECT id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
FROM invitees
ORDER BY created_at, id
"#;

pub const SELECT_INVITEE_BY_ID: &str = r#"
SELECT id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
FROM invitees
WHERE id = $1
"#;

pub const SELECT_INVITEES_BY_EVENT: &str = r#"
SELECT id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
FROM invitees
WHERE event_id = $1
ORDER BY created_at, id
"#;

pub const SELECT_INVITEES_BY_USER: &str = r#"
SELECT id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
FROM invitees
WHERE user_id = $1
ORDER BY created_at, id
"#;

/// The check-in token embeds the generated id, so the id is drawn first.
///
/// Parameters: event_id, user_id, status, qr_code (nullable), token base URL.
pub const INSERT_INVITEE: &str = r#"
WITH new_invitee AS (SELECT gen_random_uuid() AS id)
INSERT INTO invitees (id, event_id, user_id, status, qr_code)
SELECT id, $1, $2, $3, COALESCE($4, $5 || '/' || id::text)
FROM new_invitee
RETURNING id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
"#;

pub const UPDATE_INVITEE: &str = r#"
UPDATE invitees SET
    event_id = COALESCE($2, event_id),
    user_id = COALESCE($3, user_id),
    status = COALESCE($4, status),
    qr_code = COALESCE($5, qr_code),
    is_checked_in = COALESCE($6, is_checked_in),
    checked_in_at = COALESCE($7, checked_in_at)
WHERE id = $1
RETURNING id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
"#;

pub const UPDATE_INVITEE_STATUS: &str = r#"
UPDATE invitees SET status = $2
WHERE id = $1
RETURNING id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
"#;

pub const DELETE_INVITEE: &str = "DELETE FROM invitees WHERE id = $1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_statement_is_idempotent() {
        for statement in CREATE_TABLES {
            assert!(statement.contains("IF NOT EXISTS"), "{statement}");
        }
    }

    #[test]
    fn test_writes_return_full_rows() {
        for query in [
            INSERT_USER,
            UPDATE_USER,
            INSERT_EVENT,
            UPDATE_EVENT,
            INSERT_INVITEE,
            UPDATE_INVITEE,
            UPDATE_INVITEE_STATUS,
        ] {
            assert!(query.contains("RETURNING id"), "{query}");
        }
    }

    #[test]
    fn test_status_check_matches_domain() {
        use inviteazy_core::invitation::InviteeStatus;

        for status in InviteeStatus::ALL {
            assert!(CREATE_TABLES[2].contains(&format!("'{status}'")));
        }
    }
}
