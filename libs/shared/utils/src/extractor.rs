use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::jwt::validate_token;

fn authenticate(config: &AppConfig, request: &Request<Body>) -> Result<User, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    let token = &auth_value[7..];

    validate_token(token, &config.hospital_jwt_secret).map_err(AppError::Auth)
}

/// Middleware for authentication: validates the bearer token and stores the
/// resolved user in request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&config, &request)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Middleware for admin-only routes.
pub async fn require_admin(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&config, &request)?;

    if user.parsed_role() != Some(Role::Admin) {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestConfig, TestUser};
    use assert_matches::assert_matches;
    use axum::http::Request as HttpRequest;

    fn request_with_auth(value: Option<&str>) -> Request<Body> {
        let mut builder = HttpRequest::builder().uri("/doctors/");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn missing_header_is_an_auth_error() {
        let config = TestConfig::default().to_app_config();
        let err = authenticate(&config, &request_with_auth(None)).unwrap_err();
        assert_matches!(err, AppError::Auth(_));
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let config = TestConfig::default().to_app_config();
        let err = authenticate(&config, &request_with_auth(Some("Basic abc"))).unwrap_err();
        assert_matches!(err, AppError::Auth(_));
    }

    #[test]
    fn valid_bearer_resolves_the_user() {
        let test_config = TestConfig::default();
        let test_user = TestUser::admin("root@hospital.example");
        let token = JwtTestUtils::create_test_token(&test_user, &test_config.jwt_secret, None);

        let user = authenticate(
            &test_config.to_app_config(),
            &request_with_auth(Some(&JwtTestUtils::bearer(&token))),
        )
        .unwrap();

        assert_eq!(user.id, test_user.id);
        assert_eq!(user.parsed_role(), Some(Role::Admin));
    }
}
