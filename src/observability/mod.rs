//! Observability for stowage
//!
//! - Structured logs through `tracing`; every line carries an `event` field
//!   naming one [`Event`]
//! - Per-instance operation counters ([`StowageMetrics`])
//!
//! The library never installs a subscriber. Binaries choose their own; the
//! `stowage` CLI logs to stderr filtered by `STOWAGE_LOG`.
//!
//! ```ignore
//! tracing::warn!(event = %Event::StoreBackupRestored, key, "restoring entry from backup");
//! ```

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsSnapshot, StowageMetrics};
