use std::time::Duration;

use flagvault_lib::{FlagService, RequestContext};

/// Shared application state for the HTTP server.
pub struct AppState {
    pub service: FlagService,
    /// Budget for the store and cache calls of a single request.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: FlagService, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
        }
    }

    /// Fresh context for one incoming request.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }
}
