//! MariaDB schema definitions and SQL query constants.
//!
//! Ids are stored as `CHAR(36)` and generated by the repository. Timestamps
//! are `DATETIME(6)` holding UTC.

/// Statements that create the schema. Each is idempotent.
pub const CREATE_TABLES: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS users (
    id CHAR(36) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    password VARCHAR(255) NOT NULL,
    role VARCHAR(16) NOT NULL CHECK (role IN ('admin', 'public', 'tourist')),
    phone_number VARCHAR(64) NULL,
    profile_picture TEXT NULL,
    address TEXT NULL,
    created_at DATETIME(6) NOT NULL
) ENGINE=InnoDB
"#,
    r#"
CREATE TABLE IF NOT EXISTS events (
    id CHAR(36) NOT NULL PRIMARY KEY,
    user_id CHAR(36) NOT NULL,
    event_name VARCHAR(255) NOT NULL,
    event_datetime DATETIME(6) NOT NULL,
    event_location VARCHAR(255) NOT NULL,
    event_description TEXT NOT NULL,
    created_at DATETIME(6) NOT NULL,
    updated_at DATETIME(6) NOT NULL,
    INDEX idx_events_user_id (user_id),
    CONSTRAINT fk_events_user FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
) ENGINE=InnoDB
"#,
    r#"
CREATE TABLE IF NOT EXISTS invitees (
    id CHAR(36) NOT NULL PRIMARY KEY,
    event_id CHAR(36) NOT NULL,
    user_id CHAR(36) NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'accept', 'maybe', 'no', 'busy')),
    qr_code VARCHAR(512) NOT NULL,
    is_checked_in TINYINT(1) NOT NULL DEFAULT 0,
    checked_in_at DATETIME(6) NULL,
    created_at DATETIME(6) NOT NULL,
    INDEX idx_invitees_event_id (event_id),
    INDEX idx_invitees_user_id (user_id),
    CONSTRAINT fk_invitees_event FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
    CONSTRAINT fk_invitees_user FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
) ENGINE=InnoDB
"#,
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
WHERE id = ?
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, name, email, password, role, phone_number, profile_picture, address, created_at
FROM users
WHERE email = ?
"#;

pub const INSERT_USER: &str = r#"
INSERT INTO users (id, name, email, password, role, phone_number, profile_picture, address, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users SET
    name = COALESCE(?, name),
    email = COALESCE(?, email),
    password = COALESCE(?, password),
    role = COALESCE(?, role),
    phone_number = COALESCE(?, phone_number),
    profile_picture = COALESCE(?, profile_picture),
    address = COALESCE(?, address)
WHERE id = ?
"#;

pub const DELETE_USER: &str = "DELETE FROM users WHERE id = ?";

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
WHERE user_id = ?
ORDER BY created_at, id
"#;

pub const SELECT_EVENT_BY_ID: &str = r#"
SELECT id, user_id, event_name, event_datetime, event_location, event_description,
       created_at, updated_at
FROM events
WHERE id = ?
"#;

pub const INSERT_EVENT: &str = r#"
INSERT INTO events (id, user_id, event_name, event_datetime, event_location, event_description,
                    created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub const UPDATE_EVENT: &str = r#"
UPDATE events SET
    event_name = COALESCE(?, event_name),
    event_datetime = COALESCE(?, event_datetime),
    event_location = COALESCE(?, event_location),
    event_description = COALESCE(?, event_description),
    updated_at = ?
WHERE id = ?
"#;

pub const DELETE_EVENT: &str = "DELETE FROM events WHERE id = ?";

// Invitee queries
pub const SELECT_INVITEES: &str = r#"
SELECT id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
FROM invitees
ORDER BY created_at, id
"#;

pub const SELECT_INVITEE_BY_ID: &str = r#"
SELECT id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
FROM invitees
WHERE id = ?
"#;

pub const SELECT_INVITEES_BY_EVENT: &str = r#"
SELECT id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
FROM invitees
WHERE event_id = ?
ORDER BY created_at, id
"#;

pub const SELECT_INVITEES_BY_USER: &str = r#"
SELECT id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at, created_at
FROM invitees
WHERE user_id = ?
ORDER BY created_at, id
"#;

pub const INSERT_INVITEE: &str = r#"
INSERT INTO invitees (id, event_id, user_id, status, qr_code, is_checked_in, checked_in_at,
                      created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub const UPDATE_INVITEE: &str = r#"
UPDATE invitees SET
    event_id = COALESCE(?, event_id),
    user_id = COALESCE(?, user_id),
    status = COALESCE(?, status),
    qr_code = COALESCE(?, qr_code),
    is_checked_in = COALESCE(?, is_checked_in),
    checked_in_at = COALESCE(?, checked_in_at)
WHERE id = ?
"#;

pub const UPDATE_INVITEE_STATUS: &str = "UPDATE invitees SET status = ? WHERE id = ?";

pub const DELETE_INVITEE: &str = "DELETE FROM invitees WHERE id = ?";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_statements_bind_id_last() {
        for statement in [UPDATE_USER, UPDATE_EVENT, UPDATE_INVITEE, UPDATE_INVITEE_STATUS] {
            assert!(statement.trim_end().ends_with("WHERE id = ?"));
        }
    }

    #[test]
    fn test_invitee_status_check_lists_every_status() {
        use inviteazy_core::invitation::InviteeStatus;

        let invitees = CREATE_TABLES[2];
        for status in InviteeStatus::ALL {
            assert!(invitees.contains(&format!("'{}'", status.as_str())));
        }
    }
}
