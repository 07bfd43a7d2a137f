use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_backend::HospitalClient;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::jwt;

use crate::models::{LoginRequest, LoginResponse, UpstreamLoginResponse};
use crate::AuthState;

// Helper function to extract token
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    Ok(auth_value[7..].to_string())
}

/// Authenticate against the hospital backend and open a portal session.
/// This is the single write path into the session store.
pub async fn login(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    debug!("Login attempt for {}", request.email);

    let client = HospitalClient::new(&state.config);
    let upstream: UpstreamLoginResponse = client
        .post(
            "/auth/login/",
            None,
            json!({
                "email": request.email,
                "password": request.password,
            }),
        )
        .await
        .map_err(AppError::from)?;

    let user = jwt::validate_token(&upstream.token, &state.config.hospital_jwt_secret)
        .map_err(AppError::Auth)?;

    let role = user
        .parsed_role()
        .ok_or_else(|| AppError::Auth("Account has no recognized role".to_string()))?;

    let session = state
        .sessions
        .insert(&upstream.token, user, role, upstream.doctor_kind);

    info!("User {} logged in as {}", session.user.id, session.role);

    Ok(Json(LoginResponse {
        token: session.token,
        user: session.user,
        role: session.role,
        doctor_kind: session.doctor_kind,
    }))
}

/// Close the current session. Idempotent.
pub async fn logout(
    State(state): State<Arc<AuthState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let removed = state.sessions.remove(auth.token());
    debug!("Logout (session existed: {})", removed);

    Ok(Json(json!({ "success": true })))
}

/// Read the current session. An invalid token clears any session stored
/// under it before reporting the auth failure.
pub async fn get_session(
    State(state): State<Arc<AuthState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if let Err(err) = jwt::validate_token(token, &state.config.hospital_jwt_secret) {
        state.sessions.remove(token);
        return Err(AppError::Auth(err));
    }

    match state.sessions.get(token) {
        Some(session) => Ok(Json(json!(session))),
        None => Err(AppError::NotFound("No active session".to_string())),
    }
}

pub async fn validate_token(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;

    match jwt::validate_token(&token, &state.config.hospital_jwt_secret) {
        Ok(user) => {
            let response = TokenResponse {
                valid: true,
                user_id: user.id,
                email: user.email,
                role: user.role,
            };

            Ok(Json(response))
        }
        Err(err) => Err(AppError::Auth(err)),
    }
}

pub async fn verify_token(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;

    match jwt::validate_token(&token, &state.config.hospital_jwt_secret) {
        Ok(_) => Ok(Json(json!({ "valid": true }))),
        Err(_) => Ok(Json(json!({ "valid": false }))),
    }
}
