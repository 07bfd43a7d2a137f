use serde::{Deserialize, Serialize};

use shared_models::auth::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by the hospital backend's login endpoint. The role is
/// carried inside the token claims; `doctor_kind` only accompanies doctor
/// accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamLoginResponse {
    pub token: String,
    pub doctor_kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub role: Role,
    pub doctor_kind: Option<String>,
}
