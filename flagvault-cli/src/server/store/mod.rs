pub mod memory;
pub mod sled_store;

use std::sync::Arc;

use flagvault_lib::{FlagError, FlagStore};

use super::config::{StorageBackend, StorageConfig};

pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// Build the durable store selected in the configuration.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn FlagStore>, FlagError> {
    let store: Arc<dyn FlagStore> = match config.backend {
        StorageBackend::Sled => Arc::new(SledStore::open(&config.data_dir)?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}
