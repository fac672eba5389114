//! PostgreSQL storage backend.
//!
//! Uses `sqlx` with a `PgPool`. Ids and creation timestamps are assigned by
//! the database. Selected with `DB_TYPE=postgres`.

mod conversions;
mod repository;
mod schema;

pub use repository::PostgresRepository;
