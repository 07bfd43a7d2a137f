pub mod handlers;
pub mod models;
pub mod router;
pub mod session;

pub use router::*;
pub use session::SessionStore;

use std::sync::Arc;

use shared_config::AppConfig;

/// Shared state for the auth cell: configuration plus the session registry.
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
}

impl AuthState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            sessions: SessionStore::new(),
        }
    }
}
