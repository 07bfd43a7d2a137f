use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{PatientSearchQuery, UpdatePatientRequest};
use crate::services::patient::PatientService;
use crate::services::records::RecordsService;

#[axum::debug_handler]
pub async fn get_me(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .resolve_for_user(&user.id, auth.token())
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            AppError::NotFound("No patient record for the current account".to_string())
        })?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_my_records(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patients = PatientService::new(&config);
    let records = RecordsService::new(&config);

    let patient = patients
        .resolve_for_user(&user.id, auth.token())
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            AppError::NotFound("No patient record for the current account".to_string())
        })?;

    let record = records
        .medical_record(patient.id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    // Patients may only edit their own record; staff roles go through
    // the admin surface.
    let own = service
        .resolve_for_user(&user.id, auth.token())
        .await
        .map_err(AppError::from)?;
    let is_own = own.map(|p| p.id == patient_id).unwrap_or(false);
    let is_admin = user.role.as_deref() == Some("admin");

    if !is_own && !is_admin {
        return Err(AppError::Forbidden(
            "Not authorized to update this patient".to_string(),
        ));
    }

    let patient = service
        .update_patient(patient_id, request, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn list_medicines(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = RecordsService::new(&config);

    let medicines = service
        .list_medicines(auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "medicines": medicines,
        "total": medicines.len()
    })))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let page = service
        .search_patients(query, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(page)))
}
