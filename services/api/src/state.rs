//! Application state shared across handlers

use std::{sync::Arc, time::Duration};

use common::RequestContext;

use crate::service::UserService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserService>, request_timeout: Duration) -> Self {
        Self {
            user_service,
            request_timeout,
        }
    }

    /// Fresh context for one inbound request
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }
}
