use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::AppointmentState;
use auth_cell::AuthState;
use billing_cell::BillingState;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let auth_state = Arc::new(AuthState::new(state.clone()));
    let appointment_state = Arc::new(AppointmentState::new(state.clone()));
    let billing_state = Arc::new(BillingState::new(state.clone()));

    Router::new()
        .route("/", get(|| async { "Hospital Portal API is running!" }))
        .nest("/auth", auth_cell::router::auth_routes(auth_state))
        .nest("/doctors", doctor_cell::router::doctor_routes(state.clone()))
        .nest(
            "/appointments",
            appointment_cell::router::appointment_routes(appointment_state),
        )
        .nest("/billing", billing_cell::router::billing_routes(billing_state))
        .nest("/patients", patient_cell::router::patient_routes(state.clone()))
}
