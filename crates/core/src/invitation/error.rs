use thiserror::Error;

/// Errors raised when a value from a request or a stored record falls outside
/// the closed set the domain accepts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid invitee status: {0} (expected one of pending, accept, maybe, no, busy)")]
    InvalidStatus(String),
    #[error("Invalid user role: {0} (expected one of admin, public, tourist)")]
    InvalidRole(String),
}
