//! DynamoDB storage backend.
//!
//! Single-table implementation of the repository traits using
//! `aws-sdk-dynamodb`. Selected with `DB_TYPE=dynamodb`.

mod conversions;
mod error;
mod keys;
mod repository;
mod table;

pub use repository::DynamoDbRepository;
