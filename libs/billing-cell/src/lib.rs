pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::*;

use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::reconcile::ReconcileGuard;

/// Shared state for the billing cell: configuration plus the guard that
/// keeps gateway acknowledgements to one per order code.
pub struct BillingState {
    pub config: Arc<AppConfig>,
    pub reconciliations: Arc<ReconcileGuard>,
}

impl BillingState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            reconciliations: Arc::new(ReconcileGuard::new()),
        }
    }
}
