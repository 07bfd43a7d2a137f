use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_admin};

use crate::handlers::*;

pub fn patient_routes(config: Arc<AppConfig>) -> Router {
    let admin_routes = Router::new()
        .route("/search", get(search_patients))
        .layer(middleware::from_fn_with_state(config.clone(), require_admin));

    let protected_routes = Router::new()
        .route("/me", get(get_me))
        .route("/me/records", get(get_my_records))
        .route("/medicines", get(list_medicines))
        .route("/{id}", put(update_patient))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware));

    Router::new()
        .merge(admin_routes)
        .merge(protected_routes)
        .with_state(config)
}
