//! Read cache subsystem
//!
//! The read cache memoizes decoded values by key so repeated reads skip the
//! store, the transform and the codec. It is never a source of truth: a miss,
//! an eviction, or a cache that holds nothing at all changes only how often
//! the durable store is consulted, never what a read returns.
//!
//! Values are held type-erased as [`CachedValue`]; the orchestrator downcasts
//! on the way out and treats a type mismatch as a miss.

mod bounded;
mod noop;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use bounded::{CostFn, LruReadCache};
pub use noop::NoopCache;

/// A decoded value as held by a [`ReadCache`]
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Volatile key to decoded value mapping
pub trait ReadCache: Send + Sync + fmt::Debug {
    /// Insert or refresh the value for `key`
    fn put(&self, key: &str, value: CachedValue);

    /// Look up `key`, marking it recently used
    fn get(&self, key: &str) -> Option<CachedValue>;

    /// Drop `key` if present
    fn remove(&self, key: &str);

    /// Drop every entry
    fn remove_all(&self);

    /// Number of entries currently held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
