//! The orchestrator
//!
//! Reads go cache first, then store. Writes go store first, then cache,
//! then bus. A failure at any step of a write leaves the cache and the bus
//! untouched, so callers see all-or-nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::builder::StowageBuilder;
use super::errors::{StowageError, StowageResult};
use super::locks::KeyLocks;
use super::lookup::Lookup;
use crate::bus::{ChangeBus, KeyChanges};
use crate::cache::ReadCache;
use crate::codec::{Codec, JsonCodec};
use crate::observability::{Event, MetricsSnapshot, StowageMetrics};
use crate::store::DurableStore;
use crate::transform::Transform;

/// A value that can be stored and cached
///
/// Implemented for every serde type that is also `Clone + Send + Sync`.
/// Reads are typed at the call site: the same key may be read as different
/// types, and a read succeeds when the stored payload decodes as the
/// requested one.
pub trait StoredValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> StoredValue for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

pub(super) struct Inner<C> {
    store: Arc<dyn DurableStore>,
    codec: C,
    transform: Arc<dyn Transform>,
    cache: Arc<dyn ReadCache>,
    pub(super) bus: ChangeBus,
    locks: KeyLocks,
    metrics: StowageMetrics,
    executor: Option<Handle>,
}

impl<C: Codec> Inner<C> {
    /// Run `op` on a blocking worker thread
    pub(super) async fn spawn<R, F>(self: Arc<Self>, op: F) -> StowageResult<R>
    where
        F: FnOnce(&Inner<C>) -> StowageResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let executor = self.executor.clone();
        let task = move || op(&self);
        let joined = match executor {
            Some(handle) => handle.spawn_blocking(task).await,
            None => tokio::task::spawn_blocking(task).await,
        };
        joined.map_err(|e| StowageError::Worker(e.to_string()))?
    }

    fn publish(&self, key: &str) {
        self.bus.publish(key);
        self.metrics.increment_events_published();
    }

    fn cached<T: StoredValue>(&self, key: &str) -> Option<T> {
        // A value cached under another type is a miss
        self.cache
            .get(key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    pub(super) fn put_blocking<T: StoredValue>(&self, key: &str, value: T) -> StowageResult<()> {
        let _guard = self.locks.lock(key);

        let encoded = self
            .codec
            .serialize(&value)
            .map_err(|source| StowageError::Encode {
                key: key.to_string(),
                source,
            })?;
        let payload = self
            .transform
            .encrypt(key, &encoded)
            .map_err(|source| StowageError::Encrypt {
                key: key.to_string(),
                source,
            })?;

        self.store.put(key, &payload)?;
        self.metrics.increment_store_writes();

        self.cache.put(key, Arc::new(value));
        self.publish(key);
        Ok(())
    }

    pub(super) fn get_blocking<T: StoredValue>(&self, key: &str) -> StowageResult<Option<T>> {
        if let Some(value) = self.cached::<T>(key) {
            self.metrics.increment_cache_hits();
            return Ok(Some(value));
        }

        let _guard = self.locks.lock(key);
        // A writer may have filled the cache while we waited
        if let Some(value) = self.cached::<T>(key) {
            self.metrics.increment_cache_hits();
            return Ok(Some(value));
        }
        self.metrics.increment_cache_misses();

        self.metrics.increment_store_reads();
        let payload = match self.store.get(key)? {
            Some(payload) => payload,
            None => return Ok(None),
        };

        let plain = self
            .transform
            .decrypt(key, &payload)
            .map_err(|source| StowageError::Decrypt {
                key: key.to_string(),
                source,
            })?;
        let value: T = self
            .codec
            .deserialize(&plain)
            .map_err(|source| StowageError::Decode {
                key: key.to_string(),
                source,
            })?;

        self.cache.put(key, Arc::new(value.clone()));
        Ok(Some(value))
    }

    pub(super) fn delete_blocking(&self, key: &str) -> StowageResult<()> {
        let _guard = self.locks.lock(key);

        self.store.delete(key)?;
        self.cache.remove(key);
        self.metrics.add_deletes(1);
        self.publish(key);
        Ok(())
    }

    pub(super) fn delete_all_blocking(&self) -> StowageResult<()> {
        let _guards = self.locks.lock_all();

        let keys = self.store.keys()?;
        self.store.delete_all()?;
        self.cache.remove_all();
        self.metrics.add_deletes(keys.len() as u64);

        for key in &keys {
            self.publish(key);
        }
        Ok(())
    }

    /// Every entry that reads as a `T`. Entries that fail to read are
    /// left out and counted.
    pub(super) fn get_all_blocking<T: StoredValue>(&self) -> StowageResult<BTreeMap<String, T>> {
        let keys = self.store.keys()?;

        let mut entries = BTreeMap::new();
        for key in keys {
            match self.get_blocking::<T>(&key) {
                Ok(Some(value)) => {
                    entries.insert(key, value);
                }
                // Deleted since listing
                Ok(None) => {}
                Err(e) => self.skip_entry(&key, &e),
            }
        }
        Ok(entries)
    }

    pub(super) fn skip_entry(&self, key: &str, error: &StowageError) {
        self.metrics.increment_bulk_entries_skipped();
        if error.is_decode() {
            debug!(event = %Event::BulkEntrySkipped, key, error = %error, "entry does not read as the requested type");
        } else {
            warn!(event = %Event::BulkEntrySkipped, key, code = error.code(), error = %error, "entry skipped");
        }
    }
}

/// Crash-safe typed key-value store
///
/// Cheap to clone; clones share one store, cache, bus and lock table. Every
/// operation runs on a blocking worker and completes even if the returned
/// future is dropped.
///
/// ```no_run
/// use stowage::{FileStore, JsonCodec, Stowage};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let stowage = Stowage::builder()
///     .store(FileStore::open("/var/lib/app", "settings"))
///     .codec(JsonCodec::new())
///     .build()?;
///
/// stowage.put("volume", 7u8).await?;
/// assert_eq!(stowage.get::<u8>("volume").await?, Some(7));
/// # Ok(())
/// # }
/// ```
pub struct Stowage<C: Codec = JsonCodec> {
    pub(super) inner: Arc<Inner<C>>,
}

impl<C: Codec> Clone for Stowage<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Codec> fmt::Debug for Stowage<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stowage")
            .field("store", &self.inner.store)
            .field("codec", &self.inner.codec)
            .field("transform", &self.inner.transform)
            .field("cache", &self.inner.cache)
            .field("subscribers", &self.inner.bus.subscriber_count())
            .finish()
    }
}

impl Stowage {
    /// Start assembling a store
    pub fn builder() -> StowageBuilder {
        StowageBuilder::new()
    }
}

impl<C: Codec> Stowage<C> {
    pub(super) fn assemble(
        store: Arc<dyn DurableStore>,
        codec: C,
        transform: Arc<dyn Transform>,
        cache: Arc<dyn ReadCache>,
        executor: Option<Handle>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                codec,
                transform,
                cache,
                bus: ChangeBus::new(),
                locks: KeyLocks::new(),
                metrics: StowageMetrics::new(),
                executor,
            }),
        }
    }

    async fn run<R, F>(&self, op: F) -> StowageResult<R>
    where
        F: FnOnce(&Inner<C>) -> StowageResult<R> + Send + 'static,
        R: Send + 'static,
    {
        Arc::clone(&self.inner).spawn(op).await
    }

    /// Store `value` under `key`, then cache it and notify subscribers
    pub async fn put<T: StoredValue>(&self, key: impl Into<String>, value: T) -> StowageResult<()> {
        let key = key.into();
        self.run(move |inner| inner.put_blocking(&key, value)).await
    }

    /// Read `key` as a `T`. `None` when the key has no entry.
    ///
    /// A payload that does not decode as a `T` is an error.
    pub async fn get<T: StoredValue>(&self, key: impl Into<String>) -> StowageResult<Option<T>> {
        let key = key.into();
        self.run(move |inner| inner.get_blocking::<T>(&key)).await
    }

    /// The cached value of `key` as a `T`, without touching the store
    ///
    /// `None` when nothing is cached for `key` or the cached value is of
    /// another type. Runs on the calling thread.
    pub fn cached<T: StoredValue>(&self, key: &str) -> Option<T> {
        self.inner.cached::<T>(key)
    }

    /// Read `key` as a `T`, substituting `default` when absent
    pub async fn get_or<T: StoredValue>(&self, key: impl Into<String>, default: T) -> StowageResult<T> {
        Ok(self.get::<T>(key).await?.unwrap_or(default))
    }

    /// Read `key` as a `T`, reporting absence explicitly
    pub async fn get_optional<T: StoredValue>(
        &self,
        key: impl Into<String>,
    ) -> StowageResult<Lookup<T>> {
        Ok(self.get::<T>(key).await?.into())
    }

    /// Remove `key`. Removing an absent key succeeds and still notifies.
    pub async fn delete(&self, key: impl Into<String>) -> StowageResult<()> {
        let key = key.into();
        self.run(move |inner| inner.delete_blocking(&key)).await
    }

    /// Remove every entry, notifying once per removed key
    pub async fn delete_all(&self) -> StowageResult<()> {
        self.run(|inner| inner.delete_all_blocking()).await
    }

    /// Whether the durable store has an entry for `key`
    pub async fn contains(&self, key: impl Into<String>) -> StowageResult<bool> {
        let key = key.into();
        self.run(move |inner| Ok(inner.store.contains(&key)?)).await
    }

    /// Keys of the durable store
    pub async fn keys(&self) -> StowageResult<BTreeSet<String>> {
        self.run(|inner| Ok(inner.store.keys()?)).await
    }

    /// Number of entries in the durable store
    pub async fn count(&self) -> StowageResult<usize> {
        self.run(|inner| Ok(inner.store.count()?)).await
    }

    /// Every entry that reads as a `T`
    ///
    /// Entries of other types, or that fail to read, are left out and
    /// counted in [`MetricsSnapshot::bulk_entries_skipped`].
    pub async fn get_all<T: StoredValue>(&self) -> StowageResult<BTreeMap<String, T>> {
        self.run(|inner| inner.get_all_blocking::<T>()).await
    }

    /// Subscribe to the keys changed from now on
    pub fn key_changes(&self) -> KeyChanges {
        self.inner.bus.subscribe()
    }

    /// Snapshot of this instance's counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LruReadCache;
    use crate::store::{FileStore, MemoryStore};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Window {
        width: u32,
        height: u32,
    }

    fn memory() -> Stowage {
        Stowage::builder()
            .store(MemoryStore::new())
            .codec(JsonCodec::new())
            .build()
            .unwrap()
    }

    fn cached() -> Stowage {
        Stowage::builder()
            .store(MemoryStore::new())
            .codec(JsonCodec::new())
            .cache(LruReadCache::new(16))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_get_struct() {
        let stowage = memory();
        let window = Window {
            width: 800,
            height: 600,
        };
        stowage.put("window", window.clone()).await.unwrap();
        assert_eq!(stowage.get::<Window>("window").await.unwrap(), Some(window));
    }

    #[tokio::test]
    async fn test_absent_read_variants() {
        let stowage = memory();
        assert_eq!(stowage.get::<i32>("missing").await.unwrap(), None);
        assert_eq!(stowage.get_or("missing", 5).await.unwrap(), 5);
        assert_eq!(
            stowage.get_optional::<i32>("missing").await.unwrap(),
            Lookup::Absent
        );
    }

    #[tokio::test]
    async fn test_stored_none_is_present() {
        let stowage = memory();
        stowage.put("maybe", Option::<i32>::None).await.unwrap();
        assert_eq!(
            stowage.get_optional::<Option<i32>>("maybe").await.unwrap(),
            Lookup::Present(None)
        );
    }

    #[tokio::test]
    async fn test_decode_error_is_not_absent() {
        let stowage = memory();
        stowage.put("flag", true).await.unwrap();
        let err = stowage.get::<Window>("flag").await.unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let stowage = cached();
        stowage.put("n", 1i64).await.unwrap();
        assert_eq!(stowage.get::<i64>("n").await.unwrap(), Some(1));
        assert_eq!(stowage.get::<i64>("n").await.unwrap(), Some(1));

        let metrics = stowage.metrics();
        assert_eq!(metrics.cache_hits, 2);
        assert_eq!(metrics.store_reads, 0);
    }

    #[tokio::test]
    async fn test_cached_value_of_other_type_is_a_miss() {
        let stowage = cached();
        stowage.put("n", 1234i64).await.unwrap();
        assert_eq!(stowage.get::<f64>("n").await.unwrap(), Some(1234.0));
        assert_eq!(stowage.metrics().store_reads, 1);
    }

    #[tokio::test]
    async fn test_cached_read_never_reaches_store() {
        let stowage = cached();
        assert_eq!(stowage.cached::<i64>("n"), None);

        stowage.put("n", 7i64).await.unwrap();
        assert_eq!(stowage.cached::<i64>("n"), Some(7));
        assert_eq!(stowage.cached::<String>("n"), None);

        stowage.delete("n").await.unwrap();
        assert_eq!(stowage.cached::<i64>("n"), None);
        assert_eq!(stowage.metrics().store_reads, 0);
    }

    #[tokio::test]
    async fn test_cached_read_without_cache_is_none() {
        let stowage = memory();
        stowage.put("n", 7i64).await.unwrap();
        assert_eq!(stowage.cached::<i64>("n"), None);
        assert_eq!(stowage.get::<i64>("n").await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_store_write_failure_leaves_cache_and_bus_untouched() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(temp.path(), "settings"));
        let stowage = Stowage::builder()
            .shared_store(store.clone())
            .codec(JsonCodec::new())
            .cache(LruReadCache::new(16))
            .build()
            .unwrap();

        stowage.put("volume", 3u8).await.unwrap();
        let mut changes = stowage.key_changes();

        store.fail_next_write();
        let err = stowage.put("volume", 4u8).await.unwrap_err();
        assert!(matches!(&err, StowageError::Store(e) if e.is_io()));
        assert_eq!(err.code(), "STOWAGE_STORE_IO_ERROR");

        assert_eq!(stowage.cached::<u8>("volume"), Some(3));
        assert_eq!(changes.try_recv(), None);
        assert_eq!(stowage.metrics().events_published, 1);
        assert!(store.backup_path("volume").exists());

        // Bypass the cache: the backup is what the store serves
        assert_eq!(store.get("volume").unwrap().as_deref(), Some("3"));
        assert_eq!(stowage.get::<u8>("volume").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_delete_clears_cache() {
        let stowage = cached();
        stowage.put("n", 1i64).await.unwrap();
        stowage.delete("n").await.unwrap();
        assert_eq!(stowage.get::<i64>("n").await.unwrap(), None);
        assert!(!stowage.contains("n").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_key_fails_without_side_effects() {
        let stowage = cached();
        let mut changes = stowage.key_changes();
        let err = stowage.put("a/b", 1).await.unwrap_err();
        assert_eq!(err.code(), "STOWAGE_STORE_INVALID_KEY");
        assert_eq!(changes.try_recv(), None);
        assert_eq!(stowage.metrics().events_published, 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let a = memory();
        let b = a.clone();
        a.put("k", "v".to_string()).await.unwrap();
        assert_eq!(b.get::<String>("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_explicit_executor() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let stowage = Stowage::builder()
            .store(MemoryStore::new())
            .codec(JsonCodec::new())
            .executor(runtime.handle().clone())
            .build()
            .unwrap();

        // Awaited from a runtime that is not the configured executor
        let caller = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        caller.block_on(async {
            stowage.put("k", 9u8).await.unwrap();
            assert_eq!(stowage.get::<u8>("k").await.unwrap(), Some(9));
        });
    }
}
