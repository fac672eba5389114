//! JSON encoding of cache values.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CacheError, Result};

/// Serializes a value to the JSON bytes stored in the cache.
pub fn to_cache_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Deserializes cached JSON bytes.
pub fn from_cache_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invitation::{timestamp_now, Invitee, NewInvitee};
    use uuid::Uuid;

    #[test]
    fn test_invitee_survives_cache_encoding() {
        let invitee = NewInvitee::new(Uuid::new_v4(), Uuid::new_v4())
            .into_invitee(Uuid::new_v4(), timestamp_now());

        let bytes = to_cache_bytes(&invitee).unwrap();
        let decoded: Invitee = from_cache_bytes(&bytes).unwrap();

        assert_eq!(invitee, decoded);
    }

    #[test]
    fn test_empty_list_encodes_as_json_array() {
        let invitees: Vec<Invitee> = vec![];
        assert_eq!(to_cache_bytes(&invitees).unwrap(), b"[]");
    }

    #[test]
    fn test_malformed_bytes() {
        let result = from_cache_bytes::<Vec<Invitee>>(b"{\"invalid\": true}");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
