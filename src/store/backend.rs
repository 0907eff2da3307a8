//! Durable store trait

use std::collections::BTreeSet;
use std::fmt;

use super::errors::{StoreError, StoreResult};

/// Maps a string key to an opaque string payload on a persistent medium.
///
/// Implementations never interpret the payload. A failed `put` must leave the
/// previous value readable; `get` must never return a partially written
/// payload. Backends whose medium already writes single keys atomically can
/// implement these directly without a backup protocol.
pub trait DurableStore: Send + Sync + fmt::Debug {
    /// Persist `payload` under `key`, replacing any previous value
    fn put(&self, key: &str, payload: &str) -> StoreResult<()>;

    /// Read the payload for `key`, `None` if nothing is stored
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Remove every entry
    fn delete_all(&self) -> StoreResult<()>;

    /// Whether a value is stored for `key`
    fn contains(&self, key: &str) -> StoreResult<bool>;

    /// All stored keys
    fn keys(&self) -> StoreResult<BTreeSet<String>>;

    /// Number of stored keys
    fn count(&self) -> StoreResult<usize> {
        Ok(self.keys()?.len())
    }
}

/// Check that `key` can name an entry.
///
/// Keys must be non-empty and usable as a single path segment: no path
/// separators, no NUL bytes, and not `.` or `..`.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::invalid_key(key, "key is empty"));
    }
    if key == "." || key == ".." {
        return Err(StoreError::invalid_key(key, "key is a relative path component"));
    }
    if key.contains(['/', '\\', '\0']) {
        return Err(StoreError::invalid_key(
            key,
            "key contains a path separator or NUL byte",
        ));
    }
    Ok(())
}
