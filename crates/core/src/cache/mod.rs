mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    is_response_key, request_key, request_pattern, RESPONSE_KEY_PREFIX, RESPONSE_TRACKING_KEY,
};
pub use patterns::pattern_matches;
pub use serialization::{from_cache_bytes, to_cache_bytes};
pub use traits::Cache;
