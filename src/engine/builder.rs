//! Assembly of a [`Stowage`]

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

use super::stowage::Stowage;
use crate::cache::{NoopCache, ReadCache};
use crate::codec::{Codec, JsonCodec};
use crate::config::{ConfigError, ConfigResult};
use crate::store::DurableStore;
use crate::transform::{IdentityTransform, Transform};

/// Collects the components of a [`Stowage`]
///
/// The durable store and the codec are required. The cache defaults to
/// [`NoopCache`], the transform to [`IdentityTransform`], and blocking work
/// runs on the blocking pool of whichever tokio runtime awaits it.
pub struct StowageBuilder<C = JsonCodec> {
    store: Option<Arc<dyn DurableStore>>,
    codec: Option<C>,
    transform: Option<Arc<dyn Transform>>,
    cache: Option<Arc<dyn ReadCache>>,
    executor: Option<Handle>,
}

impl<C> Default for StowageBuilder<C> {
    fn default() -> Self {
        Self {
            store: None,
            codec: None,
            transform: None,
            cache: None,
            executor: None,
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for StowageBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StowageBuilder")
            .field("store", &self.store)
            .field("codec", &self.codec)
            .field("transform", &self.transform)
            .field("cache", &self.cache)
            .field("executor", &self.executor.is_some())
            .finish()
    }
}

impl<C: Codec> StowageBuilder<C> {
    /// An empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the durable store
    pub fn store(self, store: impl DurableStore + 'static) -> Self {
        self.shared_store(Arc::new(store))
    }

    /// Set a durable store that is also held elsewhere
    pub fn shared_store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the codec. May change the codec type.
    pub fn codec<D: Codec>(self, codec: D) -> StowageBuilder<D> {
        StowageBuilder {
            store: self.store,
            codec: Some(codec),
            transform: self.transform,
            cache: self.cache,
            executor: self.executor,
        }
    }

    /// Set the payload transform
    pub fn transform(self, transform: impl Transform + 'static) -> Self {
        self.shared_transform(Arc::new(transform))
    }

    /// Set a payload transform that is also held elsewhere
    pub fn shared_transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Set the read cache
    pub fn cache(self, cache: impl ReadCache + 'static) -> Self {
        self.shared_cache(Arc::new(cache))
    }

    /// Set a read cache that is also held elsewhere
    pub fn shared_cache(mut self, cache: Arc<dyn ReadCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Run blocking work on `handle`'s blocking pool
    pub fn executor(mut self, handle: Handle) -> Self {
        self.executor = Some(handle);
        self
    }

    /// Assemble the store, failing fast on missing required components
    pub fn build(self) -> ConfigResult<Stowage<C>> {
        let store = self.store.ok_or(ConfigError::MissingStore)?;
        let codec = self.codec.ok_or(ConfigError::MissingCodec)?;
        let transform = self
            .transform
            .unwrap_or_else(|| Arc::new(IdentityTransform));
        let cache = self.cache.unwrap_or_else(|| Arc::new(NoopCache));

        Ok(Stowage::assemble(
            store,
            codec,
            transform,
            cache,
            self.executor,
        ))
    }
}
