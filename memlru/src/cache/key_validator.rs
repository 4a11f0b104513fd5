//! Syntactic key validation.
//!
//! Rules are checked in a fixed order and the first failing rule is reported,
//! so the same key always yields the same error.

use super::error::{CacheError, Result};

/// Longest key accepted by memcached.
pub const DEFAULT_MAX_KEY_SIZE: usize = 250;

const DELETE: u8 = 127;
const LAST_CONTROL: u8 = 31;

/// Validates a single key against `max_key_size` (in UTF-8 bytes).
///
/// Keys arrive from the wire as raw bytes, so the UTF-8 check is the last
/// rule and covers what would otherwise be a failed encode/decode round trip.
pub fn validate_key<K: AsRef<[u8]>>(key: K, max_key_size: usize) -> Result<()> {
    let key = key.as_ref();
    if key.is_empty() {
        return Err(CacheError::invalid_key("key is empty"));
    }

    if String::from_utf8_lossy(key).chars().all(char::is_whitespace) {
        return Err(CacheError::invalid_key("key is whitespace only"));
    }

    if key.len() > max_key_size {
        return Err(CacheError::invalid_key(format!(
            "key too long, {} bytes exceeds limit of {}",
            key.len(),
            max_key_size
        )));
    }

    // bytes below 0x80 are always whole characters in UTF-8
    if key
        .iter()
        .any(|byte| *byte <= LAST_CONTROL || *byte == DELETE)
    {
        return Err(CacheError::invalid_key("key contains control characters"));
    }

    if key.contains(&b' ') {
        return Err(CacheError::invalid_key("key contains spaces"));
    }

    if std::str::from_utf8(key).is_err() {
        return Err(CacheError::invalid_key("key is not valid UTF-8"));
    }
    Ok(())
}

/// Validates keys in order and reports the first failure.
pub fn validate_keys<K: AsRef<[u8]>>(keys: &[K], max_key_size: usize) -> Result<()> {
    if keys.is_empty() {
        return Err(CacheError::missing_parameter("no keys provided"));
    }
    keys.iter()
        .try_for_each(|key| validate_key(key, max_key_size))
}
