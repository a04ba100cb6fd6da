use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use flagvault_lib::{Flag, FlagError, FlagStore, FlagValue, RequestContext};
use tokio::sync::RwLock;

/// In-memory flag storage backed by a `RwLock<HashMap>`. Nothing survives a
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Flag>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagStore for MemoryStore {
    async fn create(&self, ctx: &RequestContext, flag: &Flag) -> Result<(), FlagError> {
        let mut data = self.data.write().await;
        ctx.check()?;
        if data.contains_key(&flag.name) {
            return Err(FlagError::AlreadyExists);
        }
        data.insert(flag.name.clone(), flag.clone());
        Ok(())
    }

    async fn get_by_name(&self, _ctx: &RequestContext, name: &str) -> Result<Flag, FlagError> {
        let data = self.data.read().await;
        data.get(name).cloned().ok_or(FlagError::NotFound)
    }

    async fn update_value(
        &self,
        ctx: &RequestContext,
        name: &str,
        value: FlagValue,
    ) -> Result<Flag, FlagError> {
        let mut data = self.data.write().await;
        ctx.check()?;
        let flag = data.get_mut(name).ok_or(FlagError::NotFound)?;
        flag.value = value;
        flag.updated_at = Utc::now();
        Ok(flag.clone())
    }
}
