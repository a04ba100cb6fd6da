//! Typed feature flags backed by a durable store and a read cache.
//!
//! [`FlagService`] is the entry point. It is built from a [`FlagStore`] and a
//! [`FlagCache`] and exposes four operations:
//!
//! * [`create_flag`](FlagService::create_flag)
//! * [`get_flag`](FlagService::get_flag)
//! * [`get_flag_value`](FlagService::get_flag_value) (read-through)
//! * [`update_flag_value`](FlagService::update_flag_value) (write-through)
//!
//! # Examples
//! ```no_run
//! # use std::sync::Arc;
//! # use flagvault_lib::{CreateFlagRequest, FlagCache, FlagService, FlagStore, RequestContext, ValueInput};
//! # async fn demo(store: Arc<dyn FlagStore>, cache: Arc<dyn FlagCache>) -> Result<(), flagvault_lib::FlagError> {
//! let service = FlagService::new(store, cache);
//! let ctx = RequestContext::with_timeout(std::time::Duration::from_secs(2));
//!
//! service
//!     .create_flag(&ctx, CreateFlagRequest {
//!         name: "dark-mode".into(),
//!         flag_type: "boolean".into(),
//!         description: String::new(),
//!         value: ValueInput::boolean(true),
//!     })
//!     .await?;
//!
//! let current = service.get_flag_value(&ctx, "dark-mode").await?;
//! assert_eq!(current.value.boolean, Some(true));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod context;
pub mod dto;
pub mod error;
pub mod flag;
pub mod service;
pub mod store;
pub mod validation;

pub use cache::{CacheError, CacheMiss, FlagCache};
pub use context::{CancelHandle, Interrupted, RequestContext};
pub use dto::{
    CreateFlagRequest, FlagResponse, FlagValueResponse, UpdateFlagValueRequest, ValueInput,
};
pub use error::{ErrorClass, FlagError};
pub use flag::{Flag, FlagType, FlagValue};
pub use service::FlagService;
pub use store::FlagStore;
pub use validation::{validate_flag_name, validate_flag_value, NameRule, MAX_NAME_LEN};
