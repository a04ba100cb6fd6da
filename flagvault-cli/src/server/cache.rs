use std::sync::Arc;

use async_trait::async_trait;
use flagvault_lib::{CacheError, CacheMiss, FlagCache, FlagValue, RequestContext};
use moka::future::Cache;

use super::config::{CacheBackend, CacheConfig};
use super::metrics::metrics;

/// In-process value cache bounded by entry count. Entries never expire on
/// their own; the service overwrites or evicts them on writes.
pub struct MokaCache {
    entries: Cache<String, FlagValue>,
}

impl MokaCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_capacity).build(),
        }
    }
}

#[async_trait]
impl FlagCache for MokaCache {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<FlagValue, CacheMiss> {
        ctx.check().map_err(|_| CacheMiss)?;
        self.entries.get(name).await.ok_or(CacheMiss)
    }

    async fn set(
        &self,
        ctx: &RequestContext,
        name: &str,
        value: FlagValue,
    ) -> Result<(), CacheError> {
        ctx.check()?;
        self.entries.insert(name.to_string(), value).await;
        Ok(())
    }

    async fn delete(&self, ctx: &RequestContext, name: &str) -> Result<(), CacheError> {
        ctx.check()?;
        self.entries.invalidate(name).await;
        Ok(())
    }
}

/// A cache that is never reachable: every read misses, every write fails.
pub struct DisabledCache;

#[async_trait]
impl FlagCache for DisabledCache {
    async fn get(&self, _ctx: &RequestContext, _name: &str) -> Result<FlagValue, CacheMiss> {
        Err(CacheMiss)
    }

    async fn set(
        &self,
        _ctx: &RequestContext,
        _name: &str,
        _value: FlagValue,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache disabled".into()))
    }

    async fn delete(&self, _ctx: &RequestContext, _name: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache disabled".into()))
    }
}

/// Counts hits, misses and failed writes of the wrapped cache.
pub struct InstrumentedCache<C> {
    inner: C,
}

impl<C: FlagCache> InstrumentedCache<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

fn record(event: &str) {
    metrics().cache_events.with_label_values(&[event]).inc();
}

#[async_trait]
impl<C: FlagCache> FlagCache for InstrumentedCache<C> {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<FlagValue, CacheMiss> {
        let result = self.inner.get(ctx, name).await;
        record(if result.is_ok() { "hit" } else { "miss" });
        result
    }

    async fn set(
        &self,
        ctx: &RequestContext,
        name: &str,
        value: FlagValue,
    ) -> Result<(), CacheError> {
        let result = self.inner.set(ctx, name, value).await;
        if result.is_err() {
            record("write_error");
        }
        result
    }

    async fn delete(&self, ctx: &RequestContext, name: &str) -> Result<(), CacheError> {
        let result = self.inner.delete(ctx, name).await;
        if result.is_err() {
            record("write_error");
        }
        result
    }
}

/// Build the cache selected in the configuration, wrapped for metrics.
pub fn open_cache(config: &CacheConfig) -> Arc<dyn FlagCache> {
    match config.backend {
        CacheBackend::Moka => Arc::new(InstrumentedCache::new(MokaCache::new(config.max_capacity))),
        CacheBackend::Disabled => Arc::new(InstrumentedCache::new(DisabledCache)),
    }
}
