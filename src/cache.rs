use async_trait::async_trait;

use crate::context::{Interrupted, RequestContext};
use crate::flag::FlagValue;

/// Returned by [`FlagCache::get`] when no value can be served, whether the key
/// is absent or the backend is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cache miss")]
pub struct CacheMiss;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache call aborted: {0}")]
    Interrupted(#[from] Interrupted),
}

/// Fast read path for flag values, keyed by flag name.
#[async_trait]
pub trait FlagCache: Send + Sync {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<FlagValue, CacheMiss>;

    /// Store or overwrite the value for `name`.
    async fn set(&self, ctx: &RequestContext, name: &str, value: FlagValue)
        -> Result<(), CacheError>;

    /// Remove the entry for `name`. Removing an absent key succeeds.
    async fn delete(&self, ctx: &RequestContext, name: &str) -> Result<(), CacheError>;
}
