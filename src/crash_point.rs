//! Crash point injection for testing write durability
//!
//! Crash points are armed through the `STOWAGE_CRASH_POINT` environment
//! variable. When the named point is reached the process terminates via
//! `std::process::abort()`: no cleanup, no unwinding, no catching.
//!
//! # Usage
//!
//! ```ignore
//! use stowage::crash_point::{maybe_crash, points};
//!
//! maybe_crash(points::STORE_AFTER_BACKUP);
//! ```
//!
//! # Testing
//!
//! ```bash
//! STOWAGE_CRASH_POINT=store_after_backup stowage --dir /tmp/s put key '"v"'
//! ```

use std::sync::OnceLock;

/// Environment variable naming the armed crash point
pub const CRASH_POINT_ENV: &str = "STOWAGE_CRASH_POINT";

static CRASH_POINT: OnceLock<Option<String>> = OnceLock::new();

#[inline]
fn get_crash_point() -> Option<&'static str> {
    CRASH_POINT
        .get_or_init(|| std::env::var(CRASH_POINT_ENV).ok())
        .as_deref()
}

/// Returns true if `STOWAGE_CRASH_POINT` equals the given name.
#[inline]
pub fn crash_point_enabled(name: &str) -> bool {
    get_crash_point().map(|p| p == name).unwrap_or(false)
}

/// Abort the process if the named crash point is armed.
///
/// No-op when `STOWAGE_CRASH_POINT` is unset or names another point.
#[inline]
pub fn maybe_crash(name: &str) {
    if crash_point_enabled(name) {
        eprintln!("[CRASH] Triggering crash at point: {}", name);
        std::process::abort();
    }
}

/// All defined crash point names
pub mod points {
    // Write path of the file store
    /// Primary exists, about to be renamed to the backup file
    pub const STORE_BEFORE_BACKUP: &str = "store_before_backup";
    /// Primary renamed to backup, new primary not yet created
    pub const STORE_AFTER_BACKUP: &str = "store_after_backup";
    /// New primary half written, not yet synced
    pub const STORE_MID_WRITE: &str = "store_mid_write";
    /// New primary synced, backup not yet removed
    pub const STORE_AFTER_FSYNC: &str = "store_after_fsync";
    /// Backup removed, write committed
    pub const STORE_AFTER_COMMIT: &str = "store_after_commit";

    // Read path recovery
    /// Stale primary removed, backup not yet renamed back
    pub const STORE_BEFORE_RESTORE: &str = "store_before_restore";

    /// Get all crash point names
    pub fn all() -> &'static [&'static str] {
        &[
            STORE_BEFORE_BACKUP,
            STORE_AFTER_BACKUP,
            STORE_MID_WRITE,
            STORE_AFTER_FSYNC,
            STORE_AFTER_COMMIT,
            STORE_BEFORE_RESTORE,
        ]
    }
}
