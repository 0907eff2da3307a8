//! Observable events
//!
//! Every log line emitted by the crate carries one of these names in its
//! `event` field, so log processing can key on a stable vocabulary instead of
//! free-form messages.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // File store write path
    /// Write of a key begins
    StoreWriteBegin,
    /// Previous primary renamed to its backup
    StoreBackupCreated,
    /// Primary discarded because a backup was already pending
    StoreStalePrimaryDiscarded,
    /// New primary synced and backup removed
    StoreWriteCommit,
    /// Write failed, backup remains authoritative
    StoreWriteFailed,

    // File store read path
    /// Pending backup promoted back to primary
    StoreBackupRestored,
    /// Unreadable primary deleted
    StoreCorruptEntry,

    // File store maintenance
    /// Store directory created
    StoreDirCreated,
    /// Entry removed
    StoreDelete,
    /// Whole store directory removed
    StoreCleared,

    // Read cache
    /// Entry evicted under capacity pressure
    CacheEvict,
    /// Entry not retained because its cost exceeds capacity
    CacheSkipOversized,

    // Orchestration
    /// Change event published to subscribers
    ChangePublished,
    /// Entry left out of a bulk read or entry stream
    BulkEntrySkipped,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreWriteBegin => "STORE_WRITE_BEGIN",
            Event::StoreBackupCreated => "STORE_BACKUP_CREATED",
            Event::StoreStalePrimaryDiscarded => "STORE_STALE_PRIMARY_DISCARDED",
            Event::StoreWriteCommit => "STORE_WRITE_COMMIT",
            Event::StoreWriteFailed => "STORE_WRITE_FAILED",
            Event::StoreBackupRestored => "STORE_BACKUP_RESTORED",
            Event::StoreCorruptEntry => "STORE_CORRUPT_ENTRY",
            Event::StoreDirCreated => "STORE_DIR_CREATED",
            Event::StoreDelete => "STORE_DELETE",
            Event::StoreCleared => "STORE_CLEARED",
            Event::CacheEvict => "CACHE_EVICT",
            Event::CacheSkipOversized => "CACHE_SKIP_OVERSIZED",
            Event::ChangePublished => "CHANGE_PUBLISHED",
            Event::BulkEntrySkipped => "BULK_ENTRY_SKIPPED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake_case() {
        let events = [
            Event::StoreWriteBegin,
            Event::StoreBackupCreated,
            Event::StoreStalePrimaryDiscarded,
            Event::StoreWriteCommit,
            Event::StoreWriteFailed,
            Event::StoreBackupRestored,
            Event::StoreCorruptEntry,
            Event::StoreDirCreated,
            Event::StoreDelete,
            Event::StoreCleared,
            Event::CacheEvict,
            Event::CacheSkipOversized,
            Event::ChangePublished,
            Event::BulkEntrySkipped,
        ];
        for event in events {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
            assert_eq!(event.to_string(), name);
        }
    }
}
