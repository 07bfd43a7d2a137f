use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Error body shared with the hospital backend. Every non-2xx response,
/// theirs or ours, carries this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorEnvelope {
    /// The most specific human-readable message the envelope carries:
    /// field-level validation messages win over the generic message.
    pub fn detail(&self) -> String {
        if let Some(fields) = &self.fields {
            let joined: Vec<String> = fields
                .iter()
                .flat_map(|(name, messages)| {
                    messages.iter().map(move |m| format!("{}: {}", name, m))
                })
                .collect();
            if !joined.is_empty() {
                return joined.join("; ");
            }
        }
        if !self.message.is_empty() {
            return self.message.clone();
        }
        self.code.clone()
    }
}

/// A failed call against the hospital backend, decoded from the envelope
/// when possible and from the raw body otherwise.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl UpstreamError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            code: None,
            message: message.into(),
            fields: None,
        }
    }

    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self {
                status,
                code: Some(envelope.code.clone()),
                message: envelope.detail(),
                fields: envelope.fields,
            },
            Err(_) if !body.trim().is_empty() => Self {
                status,
                code: None,
                message: body.trim().to_string(),
                fields: None,
            },
            Err(_) => Self {
                status,
                code: None,
                message: format!("HTTP {}", status),
                fields: None,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(UpstreamError),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err.status {
            401 => AppError::Auth(err.message),
            403 => AppError::Forbidden(err.message),
            404 => AppError::NotFound(err.message),
            _ => AppError::Upstream(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, "auth_error", msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            AppError::Upstream(err) => {
                let status = StatusCode::from_u16(err.status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (status, "upstream_error", err.message, err.fields)
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        tracing::error!("Error: {}: {}", status, message);

        let mut body = json!({
            "code": code,
            "message": message,
        });
        if let Some(fields) = fields {
            body["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}
