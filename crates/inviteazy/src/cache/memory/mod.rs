//! In-memory cache backend implementation.
//!
//! Thread-safe cache with TTL support for single-instance deployments.

mod cache;

pub use cache::MemoryCache;
