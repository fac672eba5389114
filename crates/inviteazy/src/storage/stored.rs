//! Parsing of enumerated values read back from a store.
//!
//! Stores hold roles and statuses as plain strings; anything outside the
//! closed domain sets is reported as corrupt data.

use inviteazy_core::invitation::{InviteeStatus, UserRole, ValidationError};
use inviteazy_core::storage::{RepositoryError, Result};

fn invalid(err: ValidationError) -> RepositoryError {
    RepositoryError::InvalidData(err.to_string())
}

/// Parse a stored role.
pub fn parse_role(value: &str) -> Result<UserRole> {
    value.parse().map_err(invalid)
}

/// Parse a stored status.
pub fn parse_status(value: &str) -> Result<InviteeStatus> {
    value.parse().map_err(invalid)
}
