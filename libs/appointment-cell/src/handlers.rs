use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AvailabilityQuery, BookAppointmentRequest, UpdateStatusRequest};
use crate::services::booking::BookingService;
use crate::services::slots::SlotResolver;
use crate::AppointmentState;

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let resolver = SlotResolver::new(&state.config, Arc::clone(&state.board));

    let day = resolver
        .resolve(&query, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(day)))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config);

    let confirmation = service
        .book(&user, request, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(confirmation)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config);

    let appointment = service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config);

    let appointment = service
        .update_status(appointment_id, request.status, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}
