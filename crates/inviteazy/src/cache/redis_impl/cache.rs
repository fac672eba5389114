//! Redis cache implementation.
//!
//! Uses key tracking for pattern deletion without SCAN. When response
//! tracking is enabled, every response key written through this cache is
//! added to the sorted set stored at [`RESPONSE_TRACKING_KEY`], scored by its
//! expiry time in Unix seconds. Each write prunes members whose expiry has
//! passed, so the set never holds more than the live response keys.
//!
//! Tracking is only needed for `delete_pattern`. With write invalidation off
//! nothing ever deletes by pattern, so the cache is built without tracking.
//!
//! # Non-Atomicity Safety
//!
//! `set`, `delete` and `delete_pattern` each issue several Redis commands
//! without a transaction. The failure modes are harmless:
//!
//! - **Stale tracking members**: a key deleted while still tracked is removed
//!   by the next matching pattern delete or once its score expires. DEL on a
//!   missing key is a no-op.
//! - **Untracked value**: if ZADD fails after SET succeeded, the value is
//!   still bounded by its TTL.
//! - **Partial deletion**: a later call with the same pattern finishes the
//!   cleanup.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use inviteazy_core::cache::{
    is_response_key, pattern_matches, Cache, Result, RESPONSE_TRACKING_KEY,
};

use super::error::map_redis_error;

/// Score of tracked keys stored without a TTL.
const NO_EXPIRY: i64 = i64::MAX;

/// Redis cache backend using connection manager for pooling.
#[derive(Clone)]
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
    track_responses: bool,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("track_responses", &self.track_responses)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `track_responses` - record response keys so `delete_pattern` can
    ///   find them
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str, track_responses: bool) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self {
            conn,
            track_responses,
        })
    }

    async fn track(
        conn: &mut redis::aio::ConnectionManager,
        key: &str,
        seconds: Option<u64>,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let expires_at = seconds
            .and_then(|seconds| i64::try_from(seconds).ok())
            .map_or(NO_EXPIRY, |seconds| now.saturating_add(seconds));

        conn.zadd::<_, _, _, ()>(RESPONSE_TRACKING_KEY, key, expires_at)
            .await
            .map_err(map_redis_error)?;
        conn.zrembyscore::<_, _, _, ()>(RESPONSE_TRACKING_KEY, "-inf", now)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        let seconds = ttl.map(|duration| duration.as_secs().max(1));
        match seconds {
            Some(seconds) => {
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        if self.track_responses && is_response_key(key) {
            Self::track(&mut conn, key, seconds).await?;
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;

        if self.track_responses && is_response_key(key) {
            conn.zrem::<_, _, ()>(RESPONSE_TRACKING_KEY, key)
                .await
                .map_err(map_redis_error)?;
        }

        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        let now = chrono::Utc::now().timestamp();
        let tracked_keys: Vec<String> = conn
            .zrangebyscore(RESPONSE_TRACKING_KEY, now, "+inf")
            .await
            .map_err(map_redis_error)?;

        let keys_to_delete: Vec<&String> = tracked_keys
            .iter()
            .filter(|key| pattern_matches(pattern, key))
            .collect();

        if !keys_to_delete.is_empty() {
            conn.del::<_, ()>(&keys_to_delete)
                .await
                .map_err(map_redis_error)?;

            conn.zrem::<_, _, ()>(RESPONSE_TRACKING_KEY, &keys_to_delete)
                .await
                .map_err(map_redis_error)?;
        }
        tracing::trace!(pattern, deleted = keys_to_delete.len(), "Deleted cache keys");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inviteazy_core::cache::{request_key, request_pattern};
    use uuid::Uuid;

    /// Helper to get Redis URL from environment.
    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_cache() -> Option<RedisCache> {
        RedisCache::new(&redis_url(), true).await.ok()
    }

    async fn tracked_score(cache: &RedisCache, key: &str) -> Option<f64> {
        let mut conn = cache.conn.clone();
        conn.zscore(RESPONSE_TRACKING_KEY, key).await.unwrap()
    }

    /// Generate a unique test key to avoid conflicts.
    fn test_key(suffix: &str) -> String {
        format!("test:redis_cache:{}:{}", Uuid::new_v4(), suffix)
    }

    /// Generate a unique request path prefix to avoid conflicts.
    fn test_path() -> String {
        format!("/test/{}", Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_redis_set_and_get() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("set_get");
        let value = b"hello world";

        cache.set(&key, value, None).await.unwrap();

        let result = cache.get(&key).await.unwrap();
        assert_eq!(result, Some(value.to_vec()));

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_get_nonexistent() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let result = cache.get(&test_key("nonexistent")).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_redis_ttl() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("ttl");

        cache
            .set(&key, b"expiring value", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_response_keys_are_tracked() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = request_key("GET", &test_path());
        cache
            .set(&key, b"response", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        let score = tracked_score(&cache, &key).await.expect("key is tracked");
        assert!(score > chrono::Utc::now().timestamp() as f64);

        cache.delete(&key).await.unwrap();
        assert_eq!(tracked_score(&cache, &key).await, None);
    }

    #[tokio::test]
    async fn test_redis_untracked_cache_records_nothing() {
        let Ok(cache) = RedisCache::new(&redis_url(), false).await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = request_key("GET", &test_path());
        cache
            .set(&key, b"response", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        assert!(cache.get(&key).await.unwrap().is_some());
        assert_eq!(tracked_score(&cache, &key).await, None);

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_expired_members_are_pruned_on_write() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let short = request_key("GET", &test_path());
        cache
            .set(&short, b"1", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(tracked_score(&cache, &short).await.is_some());

        tokio::time::sleep(Duration::from_millis(2100)).await;

        let fresh = request_key("GET", &test_path());
        cache
            .set(&fresh, b"2", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        assert_eq!(tracked_score(&cache, &short).await, None);
        assert!(tracked_score(&cache, &fresh).await.is_some());

        cache.delete(&fresh).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_delete_pattern() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let path = test_path();
        let list = request_key("GET", &path);
        let item = request_key("GET", &format!("{path}/42"));
        let other = request_key("GET", &test_path());

        cache.set(&list, b"1", Some(Duration::from_secs(60))).await.unwrap();
        cache.set(&item, b"2", Some(Duration::from_secs(60))).await.unwrap();
        cache.set(&other, b"3", Some(Duration::from_secs(60))).await.unwrap();

        cache
            .delete_pattern(&request_pattern("GET", &path))
            .await
            .unwrap();

        assert!(cache.get(&list).await.unwrap().is_none());
        assert!(cache.get(&item).await.unwrap().is_none());
        assert!(cache.get(&other).await.unwrap().is_some());

        cache.delete(&other).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_delete_pattern_ignores_untracked_keys() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("untracked");
        cache.set(&key, b"value", None).await.unwrap();

        cache.delete_pattern("test:redis_cache:*").await.unwrap();

        assert!(cache.get(&key).await.unwrap().is_some());

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_overwrite() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("overwrite");

        cache.set(&key, b"initial", None).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"initial".to_vec()));

        cache.set(&key, b"updated", None).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"updated".to_vec()));

        cache.delete(&key).await.unwrap();
    }
}
