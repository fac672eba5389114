//! Application state shared by all request handlers.

use std::sync::Arc;

use inviteazy_core::storage::Repositories;

use crate::{
    cache::{MemoryCache, ResponseCache},
    config::Config,
    services::Services,
    storage::Storage,
};

/// Shared application state.
///
/// Cloned for each request handler. Everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub response_cache: ResponseCache,
}

impl AppState {
    pub fn new(repositories: &Repositories, response_cache: ResponseCache) -> Self {
        Self {
            services: Services::new(repositories),
            response_cache,
        }
    }

    /// In-memory repositories and cache with default settings.
    pub fn in_memory(config: &Config) -> Self {
        let storage = Storage::in_memory();
        let cache = Arc::new(MemoryCache::new(config.cache_max_entries));

        Self::new(&storage.repositories, ResponseCache::from_config(cache, config))
    }
}

impl Default for AppState {
    /// In-memory state using built-in defaults only. The environment is not
    /// read.
    fn default() -> Self {
        Self::in_memory(&Config::from_vars(|_| None))
    }
}
