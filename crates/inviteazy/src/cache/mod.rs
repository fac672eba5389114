//! Cache backend implementations and the response cache built on them.
//!
//! This module provides concrete implementations of the cache traits
//! defined in `inviteazy_core::cache`. `CACHE_BACKEND` picks one at startup.
//!
//! # Feature Flags
//!
//! - The in-memory cache is always compiled.
//! - `redis` (default): Redis cache using the redis crate

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_impl;
mod response;

use std::{fmt, str::FromStr, sync::Arc};

use inviteazy_core::cache::Cache;
use inviteazy_core::storage::StorageConfigError;

use crate::config::Config;

pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
pub use response::{CacheStatus, CachedResponse, ResponseCache};

/// Cache backend selected by `CACHE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
}

impl CacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheBackend::Memory => "memory",
            CacheBackend::Redis => "redis",
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheBackend {
    type Err = StorageConfigError;

    /// Parses the selector. A backend that is known but not compiled into
    /// this binary is rejected the same way as an unknown one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(CacheBackend::Memory),
            "redis" if cfg!(feature = "redis") => Ok(CacheBackend::Redis),
            _ => Err(StorageConfigError::UnsupportedCache(s.to_string())),
        }
    }
}

/// Builds the cache backend named in the config.
///
/// # Errors
///
/// Fails on an unsupported `CACHE_BACKEND` or when Redis is unreachable.
pub async fn build_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    let backend: CacheBackend = config.cache_backend.parse()?;

    let cache: Arc<dyn Cache> = match backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new(config.cache_max_entries)),
        #[cfg(feature = "redis")]
        CacheBackend::Redis => Arc::new(
            RedisCache::new(&config.redis_url, config.cache_invalidate_on_write).await?,
        ),
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => {
            return Err(StorageConfigError::UnsupportedCache(backend.to_string()).into())
        }
    };

    tracing::info!(
        backend = %backend,
        ttl_seconds = config.cache_ttl_seconds,
        invalidate_on_write = config.cache_invalidate_on_write,
        "Response cache ready"
    );

    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cache_backend() {
        assert_eq!("memory".parse(), Ok(CacheBackend::Memory));
        assert_eq!(" Memory ".parse(), Ok(CacheBackend::Memory));
        assert_eq!(
            "memcached".parse::<CacheBackend>(),
            Err(StorageConfigError::UnsupportedCache("memcached".to_string()))
        );
    }

    #[cfg(feature = "redis")]
    #[test]
    fn test_parse_redis_backend() {
        assert_eq!("redis".parse(), Ok(CacheBackend::Redis));
    }

    #[tokio::test]
    async fn test_build_memory_cache() {
        let config = Config::from_vars(|key| (key == "CACHE_BACKEND").then(|| "memory".into()));
        let cache = build_cache(&config).await.unwrap();

        cache.set("k", b"v", None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_build_rejects_unknown_backend() {
        let config = Config::from_vars(|key| (key == "CACHE_BACKEND").then(|| "disk".into()));
        let Err(err) = build_cache(&config).await else {
            panic!("expected an unsupported cache error");
        };

        assert_eq!(
            err.downcast_ref::<StorageConfigError>(),
            Some(&StorageConfigError::UnsupportedCache("disk".to_string()))
        );
    }
}
