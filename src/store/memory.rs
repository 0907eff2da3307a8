//! In-memory durable store
//!
//! Holds entries in a map behind a lock. Every operation is atomic per key, so
//! no backup protocol is needed. Useful for tests and for ephemeral instances.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::backend::{validate_key, DurableStore};
use super::errors::StoreResult;

/// Map-backed store with the same contract as [`FileStore`](super::FileStore)
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DurableStore for MemoryStore {
    fn put(&self, key: &str, payload: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.write().insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        Ok(self.read().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.write().remove(key);
        Ok(())
    }

    fn delete_all(&self) -> StoreResult<()> {
        self.write().clear();
        Ok(())
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        Ok(self.read().contains_key(key))
    }

    fn keys(&self) -> StoreResult<BTreeSet<String>> {
        Ok(self.read().keys().cloned().collect())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.read().len())
    }
}
