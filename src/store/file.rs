//! Crash-safe file store
//!
//! Each key lives in its own file, `<dir>/<key>.pt`. A write never touches
//! the current value in place: the old file is first renamed to
//! `<key>.pt.bak`, the new payload is written and fsynced to a fresh primary,
//! and only then is the backup removed. That removal is the commit point.
//!
//! # Recovery
//!
//! A backup that is still present means the last write to that key never
//! committed. The next read of the key deletes whatever primary exists (absent
//! or partial) and renames the backup back. Recovery is lazy and per key; no
//! startup scan is needed.
//!
//! # Concurrency
//!
//! The store holds no per-key locks. Callers that run concurrent operations
//! on the same key must serialize them; [`Stowage`](crate::Stowage) does.
//! One store instance per directory is supported.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, trace, warn};

use super::backend::{validate_key, DurableStore};
use super::errors::{StoreError, StoreResult};
use crate::crash_point::{maybe_crash, points};
use crate::observability::Event;

/// Extension of entry files
pub const VALUE_EXT: &str = ".pt";

/// Extension appended to an entry file while a write is in flight
pub const BACKUP_EXT: &str = ".bak";

/// Store directory name used when none is configured
pub const DEFAULT_STORE_NAME: &str = "stowage";

/// File-per-key durable store with backup-rename crash safety.
#[derive(Debug)]
pub struct FileStore {
    /// Directory holding the entry files
    dir: PathBuf,
    /// Whether `dir` is known to exist. Cleared by `delete_all`.
    dir_ready: AtomicBool,
    /// Makes the next primary write fail halfway through
    #[cfg(test)]
    write_failure_armed: AtomicBool,
}

impl FileStore {
    /// Create a store over `dir`. The directory is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let dir_ready = AtomicBool::new(dir.is_dir());
        Self {
            dir,
            dir_ready,
            #[cfg(test)]
            write_failure_armed: AtomicBool::new(false),
        }
    }

    /// Create a store in `<base>/<name>/`
    pub fn open(base: impl AsRef<Path>, name: &str) -> Self {
        Self::new(base.as_ref().join(name))
    }

    /// Returns the store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the primary file for `key`
    pub fn primary_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}", key, VALUE_EXT))
    }

    /// Path of the backup file for `key`
    pub fn backup_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", key, VALUE_EXT, BACKUP_EXT))
    }

    fn ensure_dir(&self) -> StoreResult<()> {
        if self.dir_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(|e| {
            StoreError::io(
                format!("Failed to create store directory: {}", self.dir.display()),
                e,
            )
        })?;
        debug!(event = %Event::StoreDirCreated, dir = %self.dir.display(), "store directory ready");
        self.dir_ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Promote a pending backup back to primary.
    ///
    /// A backup only survives an interrupted write, so whatever primary sits
    /// next to it is either missing or incomplete.
    fn restore_backup(&self, key: &str) -> StoreResult<()> {
        let backup = self.backup_path(key);
        if !backup.exists() {
            return Ok(());
        }
        let primary = self.primary_path(key);
        warn!(event = %Event::StoreBackupRestored, key, "restoring entry from backup after interrupted write");

        remove_if_exists(&primary).map_err(|e| {
            StoreError::io(
                format!("Failed to remove stale entry file: {}", primary.display()),
                e,
            )
        })?;
        maybe_crash(points::STORE_BEFORE_RESTORE);
        fs::rename(&backup, &primary).map_err(|e| {
            StoreError::io(
                format!(
                    "Failed to restore backup {} to {}",
                    backup.display(),
                    primary.display()
                ),
                e,
            )
        })
    }

    /// Delete an unreadable primary so later reads report the key absent
    fn discard_corrupt(&self, key: &str, primary: &Path, reason: &str) {
        error!(event = %Event::StoreCorruptEntry, key, reason, path = %primary.display(), "deleting unreadable entry");
        if let Err(e) = remove_if_exists(primary) {
            error!(event = %Event::StoreCorruptEntry, key, error = %e, "failed to delete unreadable entry");
        }
    }

    #[cfg(test)]
    pub(crate) fn fail_next_write(&self) {
        self.write_failure_armed.store(true, Ordering::Release);
    }

    fn write_primary(&self, primary: &Path, payload: &str) -> io::Result<()> {
        #[cfg(test)]
        if self.write_failure_armed.swap(false, Ordering::AcqRel) {
            fs::write(primary, &payload.as_bytes()[..payload.len() / 2])?;
            return Err(io::Error::new(io::ErrorKind::Other, "device full"));
        }
        write_synced(primary, payload.as_bytes())
    }

    #[cfg(unix)]
    fn sync_dir(&self) {
        // Persists the renames. On failure a power loss yields the old value.
        if let Err(e) = fs::File::open(&self.dir).and_then(|dir| dir.sync_all()) {
            debug!(dir = %self.dir.display(), error = %e, "directory fsync failed");
        }
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) {}
}

impl DurableStore for FileStore {
    fn put(&self, key: &str, payload: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.ensure_dir()?;

        let primary = self.primary_path(key);
        let backup = self.backup_path(key);
        trace!(event = %Event::StoreWriteBegin, key, bytes = payload.len(), "writing entry");

        if primary.exists() {
            if !backup.exists() {
                maybe_crash(points::STORE_BEFORE_BACKUP);
                fs::rename(&primary, &backup).map_err(|e| {
                    StoreError::io(
                        format!(
                            "Failed to rename {} to backup {}",
                            primary.display(),
                            backup.display()
                        ),
                        e,
                    )
                })?;
                trace!(event = %Event::StoreBackupCreated, key, "previous value moved to backup");
                maybe_crash(points::STORE_AFTER_BACKUP);
            } else {
                // The backup is the last committed value; this primary is
                // left over from an interrupted write.
                warn!(event = %Event::StoreStalePrimaryDiscarded, key, "discarding primary left by interrupted write");
                remove_if_exists(&primary).map_err(|e| {
                    StoreError::io(
                        format!("Failed to remove stale entry file: {}", primary.display()),
                        e,
                    )
                })?;
            }
        }

        if let Err(e) = self.write_primary(&primary, payload) {
            if let Err(cleanup) = remove_if_exists(&primary) {
                error!(key, error = %cleanup, path = %primary.display(), "failed to clean up partially written entry");
            }
            error!(event = %Event::StoreWriteFailed, key, error = %e, "write failed, backup remains authoritative");
            return Err(StoreError::io(
                format!(
                    "Failed to write entry for key '{}'; the previous value will be used on next read",
                    key
                ),
                e,
            ));
        }
        maybe_crash(points::STORE_AFTER_FSYNC);

        remove_if_exists(&backup).map_err(|e| {
            StoreError::io(
                format!("Failed to remove backup {} after write", backup.display()),
                e,
            )
        })?;
        self.sync_dir();
        maybe_crash(points::STORE_AFTER_COMMIT);

        trace!(event = %Event::StoreWriteCommit, key, "entry committed");
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        self.ensure_dir()?;
        self.restore_backup(key)?;

        let primary = self.primary_path(key);
        if !primary.exists() {
            return Ok(None);
        }

        let bytes = match fs::read(&primary) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.discard_corrupt(key, &primary, "entry file could not be read");
                return Err(StoreError::corrupt(key, "entry file could not be read", Some(e)));
            }
        };

        match String::from_utf8(bytes) {
            Ok(payload) => Ok(Some(payload)),
            Err(_) => {
                self.discard_corrupt(key, &primary, "entry is not valid UTF-8");
                Err(StoreError::corrupt(key, "entry is not valid UTF-8", None))
            }
        }
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.ensure_dir()?;

        // A pending backup would otherwise resurrect the value on next read
        for path in [self.primary_path(key), self.backup_path(key)] {
            remove_if_exists(&path).map_err(|e| {
                StoreError::io(format!("Failed to delete {} for key '{}'", path.display(), key), e)
            })?;
        }
        trace!(event = %Event::StoreDelete, key, "entry deleted");
        Ok(())
    }

    fn delete_all(&self) -> StoreResult<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StoreError::io(
                    format!("Failed to remove store directory: {}", self.dir.display()),
                    e,
                ))
            }
        }
        self.dir_ready.store(false, Ordering::Release);
        debug!(event = %Event::StoreCleared, dir = %self.dir.display(), "store cleared");
        Ok(())
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        self.ensure_dir()?;
        Ok(self.primary_path(key).exists() || self.backup_path(key).exists())
    }

    fn keys(&self) -> StoreResult<BTreeSet<String>> {
        self.ensure_dir()?;

        let mut keys = BTreeSet::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(keys),
            Err(e) => {
                return Err(StoreError::io(
                    format!("Failed to list store directory: {}", self.dir.display()),
                    e,
                ))
            }
        };

        for entry in entries {
            let entry = entry.map_err(|e| {
                StoreError::io(
                    format!("Failed to list store directory: {}", self.dir.display()),
                    e,
                )
            })?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(key) = file_name.to_str().and_then(key_from_file_name) {
                keys.insert(key.to_string());
            }
        }

        Ok(keys)
    }
}

/// Recover the key from an entry or backup file name.
///
/// Backup files map to the same key as their primary, so a key whose write
/// was interrupted before the new primary existed is still listed.
fn key_from_file_name(name: &str) -> Option<&str> {
    let key = match name.strip_suffix(BACKUP_EXT) {
        Some(stem) => stem.strip_suffix(VALUE_EXT),
        None => name.strip_suffix(VALUE_EXT),
    }?;
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Write `bytes` to a fresh file at `path` and force them to the medium.
fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    let (head, tail) = bytes.split_at(bytes.len() / 2);
    file.write_all(head)?;
    maybe_crash(points::STORE_MID_WRITE);
    file.write_all(tail)?;

    file.flush()?;
    file.sync_all()
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> FileStore {
        FileStore::open(temp.path(), "test")
    }

    #[test]
    fn test_directory_created_lazily() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert!(!store.dir().exists());

        store.put("a", "1").unwrap();
        assert!(store.dir().is_dir());
        assert!(store.primary_path("a").exists());
    }

    #[test]
    fn test_put_get_roundtrip_and_overwrite() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.put("a", "first").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("first"));

        store.put("a", "second").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("second"));
        assert!(!store.backup_path("a").exists(), "commit removes the backup");
    }

    #[test]
    fn test_payload_is_stored_verbatim() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let payload = "line one\nline two\n\n  trailing  ";

        store.put("raw", payload).unwrap();
        assert_eq!(fs::read_to_string(store.primary_path("raw")).unwrap(), payload);
        assert_eq!(store.get("raw").unwrap().as_deref(), Some(payload));
    }

    #[test]
    fn test_get_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.delete("never").unwrap();
        store.put("a", "1").unwrap();
        store.delete("a").unwrap();
        store.delete("a").unwrap();
        assert!(!store.contains("a").unwrap());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_delete_removes_pending_backup() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.put("a", "old").unwrap();
        fs::rename(store.primary_path("a"), store.backup_path("a")).unwrap();

        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_read_restores_backup_when_primary_missing() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.put("a", "old").unwrap();

        // Interrupted right after the rename pivot
        fs::rename(store.primary_path("a"), store.backup_path("a")).unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("old"));
        assert!(store.primary_path("a").exists());
        assert!(!store.backup_path("a").exists());
    }

    #[test]
    fn test_read_prefers_backup_over_partial_primary() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.put("a", "old value").unwrap();

        fs::rename(store.primary_path("a"), store.backup_path("a")).unwrap();
        fs::write(store.primary_path("a"), "new va").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("old value"));
    }

    #[test]
    fn test_write_after_interrupted_write_keeps_backup_authoritative() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.put("a", "old").unwrap();
        fs::rename(store.primary_path("a"), store.backup_path("a")).unwrap();
        fs::write(store.primary_path("a"), "garbage").unwrap();

        store.put("a", "new").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("new"));
        assert!(!store.backup_path("a").exists());
    }

    #[test]
    fn test_failed_write_leaves_backup_authoritative() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.put("a", "old").unwrap();

        store.fail_next_write();
        let err = store.put("a", "new value").unwrap_err();
        assert!(err.is_io());
        assert_eq!(err.code(), "STOWAGE_STORE_IO_ERROR");
        assert!(!store.primary_path("a").exists(), "partial primary is removed");
        assert!(store.backup_path("a").exists());

        assert_eq!(store.get("a").unwrap().as_deref(), Some("old"));
        assert!(!store.backup_path("a").exists());
    }

    #[test]
    fn test_failed_first_write_leaves_no_entry() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.fail_next_write();
        assert!(store.put("a", "value").unwrap_err().is_io());
        assert!(!store.contains("a").unwrap());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_entry_is_corrupt_then_absent() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.put("a", "ok").unwrap();
        fs::write(store.primary_path("a"), [0xff, 0xfe, 0x00]).unwrap();

        let err = store.get("a").unwrap_err();
        assert!(err.is_corrupt());
        assert!(!store.primary_path("a").exists());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_keys_strip_extensions_and_normalize_backups() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();
        store.put("c", "3").unwrap();

        // Interrupted write on c: backup only
        fs::rename(store.primary_path("c"), store.backup_path("c")).unwrap();
        // Interrupted write on b: backup plus partial primary
        fs::copy(store.primary_path("b"), store.backup_path("b")).unwrap();
        // Unrelated files are ignored
        fs::write(store.dir().join("notes.txt"), "x").unwrap();
        fs::create_dir(store.dir().join("nested.pt")).unwrap();

        let keys: Vec<_> = store.keys().unwrap().into_iter().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(store.count().unwrap(), 3);
        assert!(store.contains("c").unwrap());
    }

    #[test]
    fn test_delete_all_then_lazy_recreate() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();

        store.delete_all().unwrap();
        assert!(!store.dir().exists());

        assert_eq!(store.count().unwrap(), 0);
        store.put("c", "3").unwrap();
        assert_eq!(store.get("c").unwrap().as_deref(), Some("3"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_all_on_fresh_store() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.delete_all().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_reopen_sees_existing_entries() {
        let temp = TempDir::new().unwrap();
        store(&temp).put("a", "1").unwrap();

        let reopened = store(&temp);
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert!(matches!(
            store.put("../escape", "x"),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey { .. })));
    }

    #[test]
    fn test_key_from_file_name() {
        assert_eq!(key_from_file_name("a.pt"), Some("a"));
        assert_eq!(key_from_file_name("a.pt.bak"), Some("a"));
        assert_eq!(key_from_file_name("a.b.pt"), Some("a.b"));
        assert_eq!(key_from_file_name(".pt"), None);
        assert_eq!(key_from_file_name("a.bak"), None);
        assert_eq!(key_from_file_name("a.txt"), None);
    }
}
