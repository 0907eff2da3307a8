use super::{CachedValue, ReadCache};

/// A cache that holds nothing. Every read goes to the durable store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    pub fn new() -> Self {
        NoopCache
    }
}

impl ReadCache for NoopCache {
    fn put(&self, _key: &str, _value: CachedValue) {}

    fn get(&self, _key: &str) -> Option<CachedValue> {
        None
    }

    fn remove(&self, _key: &str) {}

    fn remove_all(&self) {}

    fn len(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_noop_never_holds_values() {
        let cache = NoopCache::new();
        cache.put("a", Arc::new(1i32));
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }
}
