//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `inviteazy_core::storage`. Backends are compiled in via feature
//! flags and one of them is selected at runtime with `DB_TYPE`.
//!
//! # Feature Flags
//!
//! - `postgres`: PostgreSQL backend using `sqlx`
//! - `mariadb`: MariaDB backend using `sqlx`
//! - `mongodb`: MongoDB backend using the `mongodb` driver
//! - `dynamodb`: AWS DynamoDB backend using `aws-sdk-dynamodb`
//!
//! All four are enabled by default. The in-memory backend is always available.
//!
//! # Examples
//!
//! Build with only PostgreSQL:
//! ```bash
//! cargo build -p inviteazy --no-default-features --features postgres
//! ```

mod factory;
pub mod inmemory;
mod stored;

#[cfg(any(feature = "postgres", feature = "mariadb"))]
pub(crate) mod sql_error;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "mariadb")]
pub mod mariadb;

#[cfg(feature = "mongodb")]
pub mod mongodb;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(test)]
pub(crate) mod contract;

pub use factory::{is_compiled, parse_selector, Storage, StorageError, StorageHandle};
pub use inmemory::InMemoryRepository;
