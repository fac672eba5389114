//! MariaDB storage backend.
//!
//! Uses `sqlx` with a `MySqlPool`. Selected with `DB_TYPE=mariadb`.

mod conversions;
mod repository;
mod schema;

pub use repository::MariaDbRepository;
