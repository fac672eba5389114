//! Domain core for the Inviteazy backend.
//!
//! Pure types and functions only: entities, the repository and cache traits,
//! cache keys, and guest-insight aggregation. All I/O lives in the server
//! crate.

pub mod cache;
pub mod invitation;
pub mod storage;
