use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{ConfirmRequest, ConfirmationQuery, PaymentReturnQuery};
use crate::services::billing::BillingService;
use crate::services::reconcile::ReconcileService;
use crate::BillingState;

#[axum::debug_handler]
pub async fn get_confirmation(
    State(state): State<Arc<BillingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<i64>,
    Query(query): Query<ConfirmationQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BillingService::new(&state.config);

    // Partial loads still render; the context carries its own error.
    let context = service
        .load_confirmation(appointment_id, query.doctor_id, auth.token())
        .await;

    Ok(Json(json!(context)))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<BillingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BillingService::new(&state.config);

    let redirect = service
        .confirm_and_pay(request, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(redirect)))
}

/// Gateway return landing. Unauthenticated: the browser arrives here on a
/// redirect, carrying only the gateway's query parameters.
#[axum::debug_handler]
pub async fn payment_return(
    State(state): State<Arc<BillingState>>,
    Query(query): Query<PaymentReturnQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ReconcileService::new(&state.config, Arc::clone(&state.reconciliations));

    let outcome = service
        .reconcile_return(&query)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(outcome)))
}

#[axum::debug_handler]
pub async fn get_bill(
    State(state): State<Arc<BillingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(bill_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = BillingService::new(&state.config);

    let bill = service
        .get_bill(bill_id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(bill)))
}
