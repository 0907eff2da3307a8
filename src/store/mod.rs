//! Durable store subsystem
//!
//! The durable store is the source of truth: a key maps to at most one opaque
//! payload string. [`FileStore`] keeps one file per key and survives crashes
//! mid-write; [`MemoryStore`] is a volatile implementation of the same
//! contract.
//!
//! # Invariants
//!
//! - A crash during a write never loses the previous value
//! - A read never returns a half-written payload
//! - A write is durable only once its data is synced and its backup removed
//! - Interrupted writes are repaired on the next read of the same key

mod backend;
mod errors;
mod file;
mod memory;

pub use backend::{validate_key, DurableStore};
pub use errors::{StoreError, StoreResult};
pub use file::{FileStore, BACKUP_EXT, DEFAULT_STORE_NAME, VALUE_EXT};
pub use memory::MemoryStore;
