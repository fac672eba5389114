//! Response cache overlay for read-heavy GET routes.
//!
//! Values are keyed by HTTP method and full request path
//! (`cache:{METHOD}:{path}`) and hold the serialized response body. Writes
//! leave cached reads alone unless `CACHE_INVALIDATE_ON_WRITE` is set, so by
//! default a read may be stale for up to one TTL after a write.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use inviteazy_core::cache::{request_key, request_pattern, to_cache_bytes, Cache, CacheError};

use crate::config::Config;

/// Path prefix of the cached event routes.
pub const EVENTS_PATH: &str = "/api/v1/events";
/// Path prefix of the cached invitation routes.
pub const INVITATIONS_PATH: &str = "/api/v1/invitations";

/// Whether a response came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// A serialized JSON body plus how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub body: Vec<u8>,
    pub status: CacheStatus,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                ),
                (
                    header::HeaderName::from_static("x-cache"),
                    HeaderValue::from_static(self.status.as_str()),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Read-through cache of serialized responses.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    invalidate_on_write: bool,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("invalidate_on_write", &self.invalidate_on_write)
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration, invalidate_on_write: bool) -> Self {
        Self {
            cache,
            ttl,
            invalidate_on_write,
        }
    }

    /// Creates a response cache with the TTL and invalidation policy from `config`.
    pub fn from_config(cache: Arc<dyn Cache>, config: &Config) -> Self {
        Self::new(cache, config.cache_ttl(), config.cache_invalidate_on_write)
    }

    /// Returns the cached body for `method` + `path`, or runs `fetch`, stores
    /// its serialized value, and returns it.
    ///
    /// Errors from `fetch` are returned as-is and nothing is stored. A
    /// failing cache backend is logged and treated as a miss.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        method: &str,
        path: &str,
        fetch: F,
    ) -> Result<CachedResponse, E>
    where
        T: Serialize,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = request_key(method, path);

        match self.cache.get(&key).await {
            Ok(Some(body)) => {
                tracing::trace!(key = %key, "Response cache hit");
                return Ok(CachedResponse {
                    body,
                    status: CacheStatus::Hit,
                });
            }
            Ok(None) => tracing::trace!(key = %key, "Response cache miss"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Response cache read failed"),
        }

        let value = fetch().await?;
        let body = to_cache_bytes(&value)?;

        if let Err(e) = self.cache.set(&key, &body, Some(self.ttl)).await {
            tracing::warn!(key = %key, error = %e, "Response cache write failed");
        }

        Ok(CachedResponse {
            body,
            status: CacheStatus::Miss,
        })
    }

    /// Drops cached event reads after a write, when enabled.
    pub async fn invalidate_events(&self) {
        self.invalidate(EVENTS_PATH).await;
    }

    /// Drops cached invitation reads after a write, when enabled.
    pub async fn invalidate_invitations(&self) {
        self.invalidate(INVITATIONS_PATH).await;
    }

    async fn invalidate(&self, path_prefix: &str) {
        if !self.invalidate_on_write {
            return;
        }

        let pattern = request_pattern("GET", path_prefix);
        match self.cache.delete_pattern(&pattern).await {
            Ok(()) => tracing::debug!(pattern = %pattern, "Invalidated cached responses"),
            Err(e) => tracing::warn!(pattern = %pattern, error = %e, "Response cache invalidation failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cache::MemoryCache;

    fn memory_cache(ttl: Duration, invalidate_on_write: bool) -> ResponseCache {
        ResponseCache::new(Arc::new(MemoryCache::new(100)), ttl, invalidate_on_write)
    }

    /// Counts how many times the wrapped read actually runs.
    struct CountingSource {
        calls: AtomicUsize,
        value: std::sync::Mutex<Vec<&'static str>>,
    }

    impl CountingSource {
        fn with(values: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                value: std::sync::Mutex::new(values),
            })
        }

        async fn find_all(&self) -> Result<Vec<&'static str>, CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.lock().unwrap().clone())
        }

        fn push(&self, value: &'static str) {
            self.value.lock().unwrap().push(value);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    /// A cache backend that fails every call.
    struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get(&self, _key: &str) -> inviteazy_core::cache::Result<Option<Vec<u8>>> {
            Err(CacheError::ConnectionFailed("down".to_string()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: &[u8],
            _ttl: Option<Duration>,
        ) -> inviteazy_core::cache::Result<()> {
            Err(CacheError::ConnectionFailed("down".to_string()))
        }

        async fn delete(&self, _key: &str) -> inviteazy_core::cache::Result<()> {
            Err(CacheError::ConnectionFailed("down".to_string()))
        }

        async fn delete_pattern(&self, _pattern: &str) -> inviteazy_core::cache::Result<()> {
            Err(CacheError::ConnectionFailed("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_second_read_within_ttl_is_served_from_cache() {
        let cache = memory_cache(Duration::from_secs(360), false);
        let source = CountingSource::with(vec!["a"]);

        let first = cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();
        let second = cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();

        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(first.body, second.body);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_read_after_ttl_refetches() {
        let cache = memory_cache(Duration::from_millis(50), false);
        let source = CountingSource::with(vec!["a"]);

        cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let again = cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();

        assert_eq!(again.status, CacheStatus::Miss);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_distinct_paths_are_cached_separately() {
        let cache = memory_cache(Duration::from_secs(360), false);
        let source = CountingSource::with(vec!["a"]);

        cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();
        cache
            .get_or_fetch("GET", INVITATIONS_PATH, || source.find_all())
            .await
            .unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_write_without_invalidation_leaves_stale_read() {
        let cache = memory_cache(Duration::from_secs(360), false);
        let source = CountingSource::with(vec!["a"]);

        let before = cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();

        source.push("b");
        cache.invalidate_events().await;

        let after = cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();

        assert_eq!(after.status, CacheStatus::Hit);
        assert_eq!(after.body, before.body);
        assert_eq!(after.body, br#"["a"]"#.to_vec());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_write_with_invalidation_purges_matching_reads() {
        let cache = memory_cache(Duration::from_secs(360), true);
        let source = CountingSource::with(vec!["a"]);
        let item_path = format!("{EVENTS_PATH}/42");

        cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();
        cache
            .get_or_fetch("GET", &item_path, || source.find_all())
            .await
            .unwrap();
        cache
            .get_or_fetch("GET", INVITATIONS_PATH, || source.find_all())
            .await
            .unwrap();

        source.push("b");
        cache.invalidate_events().await;

        let list = cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();
        let item = cache
            .get_or_fetch("GET", &item_path, || source.find_all())
            .await
            .unwrap();
        let invitations = cache
            .get_or_fetch("GET", INVITATIONS_PATH, || source.find_all())
            .await
            .unwrap();

        assert_eq!(list.status, CacheStatus::Miss);
        assert_eq!(list.body, br#"["a","b"]"#.to_vec());
        assert_eq!(item.status, CacheStatus::Miss);
        assert_eq!(invitations.status, CacheStatus::Hit);
        assert_eq!(source.calls(), 5);
    }

    #[tokio::test]
    async fn test_fetch_errors_are_not_cached() {
        let cache = memory_cache(Duration::from_secs(360), false);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..2 {
            let result: Result<CachedResponse, CacheError> = cache
                .get_or_fetch("GET", "/api/v1/events/missing", || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(CacheError::OperationFailed("not found".to_string()))
                })
                .await;
            assert!(result.is_err());
        }

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_broken_cache_falls_through_to_fetch() {
        let cache = ResponseCache::new(Arc::new(BrokenCache), Duration::from_secs(360), true);
        let source = CountingSource::with(vec!["a"]);

        let first = cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();
        let second = cache
            .get_or_fetch("GET", EVENTS_PATH, || source.find_all())
            .await
            .unwrap();
        cache.invalidate_events().await;

        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(second.status, CacheStatus::Miss);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_cached_response_sets_headers() {
        let response = CachedResponse {
            body: b"{}".to_vec(),
            status: CacheStatus::Hit,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-cache"], "HIT");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }
}
