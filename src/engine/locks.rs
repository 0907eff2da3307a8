//! Striped per-key locks
//!
//! Operations on the same key are serialized; operations on different keys
//! usually proceed in parallel but may share a stripe. Stripes are always
//! acquired in index order, so holding one and taking all cannot deadlock
//! as long as no caller takes a second single stripe while holding one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

const STRIPES: usize = 32;

#[derive(Debug)]
pub(crate) struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self {
            stripes: (0..STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    fn stripe(&self, key: &str) -> usize {
        // Only needs to be stable within this process
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    /// Serialize against every other holder of `key`'s stripe
    pub(crate) fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe(key)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclude all single-key operations
    pub(crate) fn lock_all(&self) -> Vec<MutexGuard<'_, ()>> {
        self.stripes
            .iter()
            .map(|stripe| stripe.lock().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_same_stripe() {
        let locks = KeyLocks::new();
        assert_eq!(locks.stripe("alpha"), locks.stripe("alpha"));
        assert!(locks.stripe("beta") < STRIPES);
    }

    #[test]
    fn test_lock_all_after_release() {
        let locks = KeyLocks::new();
        drop(locks.lock("a"));
        let all = locks.lock_all();
        assert_eq!(all.len(), STRIPES);
        assert!(locks.stripes[0].try_lock().is_err());
    }
}
