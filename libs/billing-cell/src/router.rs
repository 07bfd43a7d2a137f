use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::*;
use crate::BillingState;

pub fn billing_routes(state: Arc<BillingState>) -> Router {
    let public_routes = Router::new().route("/payment/return", get(payment_return));

    let protected_routes = Router::new()
        .route("/confirm", post(confirm_appointment))
        .route("/confirmation/{id}", get(get_confirmation))
        .route("/bills/{id}", get(get_bill))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
