//! Cache key construction for the response cache.
//!
//! Keys are derived from the HTTP method and the full request path, so a
//! cached value is a response body rather than a repository result.

/// Prefix shared by every response-cache key.
pub const RESPONSE_KEY_PREFIX: &str = "cache:";

/// Key of the sorted set that tracks live response keys in shared caches,
/// scored by expiry time.
///
/// It deliberately does not start with [`RESPONSE_KEY_PREFIX`] so that no
/// response pattern can match it.
pub const RESPONSE_TRACKING_KEY: &str = "_keys:cache";

/// Returns the cache key for a request.
///
/// The method is upper-cased; the path (including any query string) is kept
/// verbatim.
///
/// # Examples
///
/// ```
/// use inviteazy_core::cache::request_key;
///
/// assert_eq!(request_key("get", "/api/v1/events"), "cache:GET:/api/v1/events");
/// ```
pub fn request_key(method: &str, path: &str) -> String {
    format!(
        "{}{}:{}",
        RESPONSE_KEY_PREFIX,
        method.to_ascii_uppercase(),
        path
    )
}

/// Returns the pattern matching every cached response under a path prefix.
pub fn request_pattern(method: &str, path_prefix: &str) -> String {
    format!("{}*", request_key(method, path_prefix))
}

/// Checks if a key belongs to the response cache.
pub fn is_response_key(key: &str) -> bool {
    key.starts_with(RESPONSE_KEY_PREFIX)
}
