//! stowage - a crash-safe embedded key-value store
//!
//! Values of any serde type are stored under string keys. A write goes
//! through a [`codec::Codec`], a [`transform::Transform`] and finally a
//! [`store::DurableStore`]; reads check an optional [`cache::ReadCache`]
//! first. Every successful put or delete is announced on a per-instance
//! [`bus::ChangeBus`], from which the key, entry and whole-collection streams
//! of [`engine::Stowage`] are derived.
//!
//! ```ignore
//! use stowage::{FileStore, JsonCodec, Stowage};
//!
//! let stowage = Stowage::builder()
//!     .store(FileStore::open(base_dir, "settings"))
//!     .codec(JsonCodec::new())
//!     .build()?;
//!
//! stowage.put("dark_mode", true).await?;
//! assert_eq!(stowage.get::<bool>("dark_mode").await?, Some(true));
//! ```

pub mod bus;
pub mod cache;
pub mod cli;
pub mod codec;
pub mod config;
pub mod crash_point;
pub mod engine;
pub mod observability;
pub mod store;
pub mod transform;

pub use bus::{ChangeBus, KeyChanges};
pub use cache::{CachedValue, LruReadCache, NoopCache, ReadCache};
pub use codec::{Codec, CodecError, JsonCodec};
pub use config::{ConfigError, ConfigResult, StowageConfig, TransformKind};
pub use engine::{Lookup, StoredValue, Stowage, StowageBuilder, StowageError, StowageResult};
pub use observability::{MetricsSnapshot, StowageMetrics};
pub use store::{DurableStore, FileStore, MemoryStore, StoreError, StoreResult};
pub use transform::{Base64Transform, IdentityTransform, Transform, TransformError};
