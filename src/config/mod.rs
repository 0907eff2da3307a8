//! File-based configuration
//!
//! A JSON document describing one file-backed store:
//!
//! ```json
//! {
//!   "base_dir": "/var/lib/app",
//!   "name": "settings",
//!   "cache_capacity": 256,
//!   "transform": "base64",
//!   "pretty_json": false
//! }
//! ```
//!
//! Only `base_dir` is required. Entries live under `<base_dir>/<name>/`.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::LruReadCache;
use crate::codec::JsonCodec;
use crate::engine::{Stowage, StowageBuilder};
use crate::store::{FileStore, DEFAULT_STORE_NAME};
use crate::transform::{Base64Transform, IdentityTransform};

/// Payload transform selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    #[default]
    Identity,
    Base64,
}

/// Configuration of a file-backed [`Stowage`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StowageConfig {
    /// Parent directory of the store directory (required)
    pub base_dir: PathBuf,

    /// Store directory name (default "stowage")
    #[serde(default = "default_name")]
    pub name: String,

    /// Read cache capacity in entries; 0 disables caching (default 0)
    #[serde(default)]
    pub cache_capacity: usize,

    /// Payload transform (default identity)
    #[serde(default)]
    pub transform: TransformKind,

    /// Indent stored JSON (default false)
    #[serde(default)]
    pub pretty_json: bool,
}

fn default_name() -> String {
    DEFAULT_STORE_NAME.to_string()
}

impl StowageConfig {
    /// Defaults for a store under `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            name: default_name(),
            cache_capacity: 0,
            transform: TransformKind::default(),
            pretty_json: false,
        }
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: StowageConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("base_dir must not be empty"));
        }
        if self.name.is_empty() || self.name == "." || self.name == ".." {
            return Err(ConfigError::invalid(format!(
                "name '{}' cannot name a store directory",
                self.name
            )));
        }
        if self.name.contains(['/', '\\', '\0']) {
            return Err(ConfigError::invalid(format!(
                "name '{}' must be a single path segment",
                self.name
            )));
        }
        Ok(())
    }

    /// Directory holding the entry files
    pub fn store_dir(&self) -> PathBuf {
        self.base_dir.join(&self.name)
    }

    /// Builder pre-populated from this configuration. Callers may still
    /// override any component before building.
    pub fn builder(&self) -> ConfigResult<StowageBuilder<JsonCodec>> {
        self.validate()?;

        let codec = if self.pretty_json {
            JsonCodec::pretty()
        } else {
            JsonCodec::new()
        };
        let mut builder = Stowage::builder()
            .store(FileStore::new(self.store_dir()))
            .codec(codec);
        builder = match self.transform {
            TransformKind::Identity => builder.transform(IdentityTransform),
            TransformKind::Base64 => builder.transform(Base64Transform),
        };
        if self.cache_capacity > 0 {
            builder = builder.cache(LruReadCache::new(self.cache_capacity));
        }
        Ok(builder)
    }

    /// Assemble the configured store
    pub fn open(&self) -> ConfigResult<Stowage<JsonCodec>> {
        self.builder()?.build()
    }
}
