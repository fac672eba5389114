//! In-memory storage backend.
//!
//! Stores all data in HashMaps wrapped in `Arc<RwLock<_>>`. Selected with
//! `DB_TYPE=memory`; used by the test suite and for local development where
//! persistence is not required.

mod repository;

pub use repository::InMemoryRepository;
