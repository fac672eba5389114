//! Redis cache backend implementation.
//!
//! Provides a shared response cache for multi-instance deployments.

mod cache;
mod error;

pub use cache::RedisCache;
