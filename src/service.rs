use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, FlagCache};
use crate::context::RequestContext;
use crate::dto::{CreateFlagRequest, FlagResponse, FlagValueResponse, UpdateFlagValueRequest};
use crate::error::FlagError;
use crate::flag::{Flag, FlagType, FlagValue};
use crate::store::FlagStore;
use crate::validation::{validate_flag_name, validate_flag_value};

/// Coordinates the durable store and the read cache.
///
/// The store is the source of truth and a hard dependency: its failures are
/// returned to the caller untouched. The cache is a soft dependency: it is only
/// written after the store has accepted a write, and its failures are logged
/// and swallowed. A stale or missing cache entry is repaired by the next
/// [`get_flag_value`](Self::get_flag_value) that misses.
///
/// Holds no mutable state, so one instance can serve concurrent callers.
pub struct FlagService {
    store: Arc<dyn FlagStore>,
    cache: Arc<dyn FlagCache>,
}

impl FlagService {
    pub fn new(store: Arc<dyn FlagStore>, cache: Arc<dyn FlagCache>) -> Self {
        Self { store, cache }
    }

    pub async fn create_flag(
        &self,
        ctx: &RequestContext,
        req: CreateFlagRequest,
    ) -> Result<FlagResponse, FlagError> {
        validate_flag_name(&req.name)?;
        let flag_type: FlagType = req.flag_type.parse()?;
        let value = validate_flag_value(flag_type, &req.value)?;

        let flag = Flag::new(req.name, flag_type, req.description, value, Utc::now());
        bounded(ctx, self.store.create(ctx, &flag)).await?;
        info!(flag = %flag.name, flag_type = %flag.flag_type, "flag created");

        if let Err(err) = self.cache_set(ctx, &flag.name, value).await {
            warn!(flag = %flag.name, error = %err, "failed to warm cache after create");
        }

        Ok(flag.into())
    }

    /// Full record straight from the store. The cache only holds values, so it
    /// is not consulted here.
    pub async fn get_flag(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<FlagResponse, FlagError> {
        let flag = bounded(ctx, self.store.get_by_name(ctx, name)).await?;
        Ok(flag.into())
    }

    /// Read-through: serve from the cache, fall back to the store on any miss
    /// and repopulate the cache from what the store returned.
    pub async fn get_flag_value(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<FlagValueResponse, FlagError> {
        // An unreachable cache and an absent key look the same from here.
        let cached = ctx
            .run(self.cache.get(ctx, name))
            .await
            .ok()
            .and_then(Result::ok);
        if let Some(value) = cached {
            debug!(flag = %name, "cache hit");
            return Ok(value.into());
        }
        debug!(flag = %name, "cache miss");

        let flag = bounded(ctx, self.store.get_by_name(ctx, name)).await?;
        if let Err(err) = self.cache_set(ctx, name, flag.value).await {
            warn!(flag = %name, error = %err, "failed to repopulate cache");
        }

        Ok(flag.value.into())
    }

    /// Write-through: validate against the stored type, write the store, then
    /// mirror the new value into the cache.
    pub async fn update_flag_value(
        &self,
        ctx: &RequestContext,
        name: &str,
        req: UpdateFlagValueRequest,
    ) -> Result<FlagResponse, FlagError> {
        let existing = bounded(ctx, self.store.get_by_name(ctx, name)).await?;
        let value = validate_flag_value(existing.flag_type, &req.value)?;

        // The cache is never touched unless this write succeeded.
        let updated = bounded(ctx, self.store.update_value(ctx, name, value)).await?;
        info!(flag = %name, value = %updated.value, "flag value updated");

        if let Err(err) = self.cache_set(ctx, name, updated.value).await {
            warn!(flag = %name, error = %err, "failed to write through to cache");
            // Drop the old entry so it cannot outlive the store write.
            if let Err(err) = self.cache_delete(ctx, name).await {
                warn!(flag = %name, error = %err, "failed to evict stale cache entry");
            }
        }

        Ok(updated.into())
    }

    async fn cache_set(
        &self,
        ctx: &RequestContext,
        name: &str,
        value: FlagValue,
    ) -> Result<(), CacheError> {
        match ctx.run(self.cache.set(ctx, name, value)).await {
            Ok(res) => res,
            Err(interrupted) => Err(interrupted.into()),
        }
    }

    async fn cache_delete(&self, ctx: &RequestContext, name: &str) -> Result<(), CacheError> {
        match ctx.run(self.cache.delete(ctx, name)).await {
            Ok(res) => res,
            Err(interrupted) => Err(interrupted.into()),
        }
    }
}

/// Run a store call under the context's deadline and cancellation.
async fn bounded<T, F>(ctx: &RequestContext, call: F) -> Result<T, FlagError>
where
    F: Future<Output = Result<T, FlagError>>,
{
    ctx.run(call).await?
}
