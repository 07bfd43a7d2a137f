use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DoctorQuery, ScheduleQuery};
use crate::services::directory::DoctorDirectoryService;
use crate::services::schedule::ScheduleService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorDirectoryService::new(&config);

    let page = service
        .list_doctors(query, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(page)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorDirectoryService::new(&config);

    let doctor = service
        .get_doctor(doctor_id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn list_departments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorDirectoryService::new(&config);

    let departments = service
        .list_departments(auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "departments": departments,
        "total": departments.len()
    })))
}

#[axum::debug_handler]
pub async fn list_schedules(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);

    let schedules = service
        .schedules_for(doctor_id, query.work_date, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(schedules)))
}
