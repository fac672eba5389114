//! MongoDB storage backend.
//!
//! Stores users, events and invitees in separate collections of one
//! database. Selected with `DB_TYPE=mongodb`.

mod documents;
mod error;
mod repository;

pub use repository::MongoDbRepository;
