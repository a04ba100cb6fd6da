use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::FlagError;
use crate::flag::{Flag, FlagValue};

/// Durable storage for flags. Implementations must be thread-safe.
///
/// Adapters check `ctx` before mutating anything so an expired or cancelled
/// call never lands partially. Any failure they cannot classify is reported as
/// [`FlagError::Infra`].
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Insert a new flag. [`FlagError::AlreadyExists`] if the name is taken.
    async fn create(&self, ctx: &RequestContext, flag: &Flag) -> Result<(), FlagError>;

    /// Full read by name. [`FlagError::NotFound`] if there is no such flag.
    async fn get_by_name(&self, ctx: &RequestContext, name: &str) -> Result<Flag, FlagError>;

    /// Overwrite the value, refresh `updated_at` and return the stored flag.
    /// [`FlagError::NotFound`] if there is no such flag.
    ///
    /// Does not re-check the value against the flag type; callers validate
    /// first.
    async fn update_value(
        &self,
        ctx: &RequestContext,
        name: &str,
        value: FlagValue,
    ) -> Result<Flag, FlagError>;
}
