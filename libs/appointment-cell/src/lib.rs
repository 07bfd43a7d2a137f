pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::*;

use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::slots::AvailabilityBoard;

/// Shared state for the appointment cell: configuration plus the
/// availability board that absorbs slot refreshes.
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub board: Arc<AvailabilityBoard>,
}

impl AppointmentState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            board: Arc::new(AvailabilityBoard::new()),
        }
    }
}
