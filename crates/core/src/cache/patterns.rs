//! Glob matching for cache keys.
//!
//! Only `*` is special: it matches any run of characters, including none.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use inviteazy_core::cache::pattern_matches;
///
/// assert!(pattern_matches("cache:GET:/api/v1/events", "cache:GET:/api/v1/events"));
/// assert!(pattern_matches("cache:GET:/api/v1/events*", "cache:GET:/api/v1/events/42"));
/// assert!(pattern_matches("cache:*:/api/v1/events", "cache:HEAD:/api/v1/events"));
/// assert!(!pattern_matches("cache:GET:/api/v1/events*", "cache:GET:/api/v1/invitations"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();

    // No wildcard: exact match.
    let [first, middle @ .., last] = segments.as_slice() else {
        return pattern == key;
    };

    let Some(mut remaining) = key.strip_prefix(first) else {
        return false;
    };

    for segment in middle {
        if segment.is_empty() {
            continue;
        }
        match remaining.find(segment) {
            Some(pos) => remaining = &remaining[pos + segment.len()..],
            None => return false,
        }
    }

    remaining.ends_with(last)
}
