use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn doctor_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_doctors))
        .route("/departments", get(list_departments))
        .route("/{id}", get(get_doctor))
        .route("/{id}/schedules", get(list_schedules))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
