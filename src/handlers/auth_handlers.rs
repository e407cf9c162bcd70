use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::error::{ErrorResponse, rejected_body};
use crate::models::auth::{AuthResponse, LoginRequest};
use crate::models::user::CreateUserRequest;
use crate::services::auth_service::{AuthError, AuthService};

/// Convert AuthError to HTTP response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AuthError::Validation(errors) => {
                return ErrorResponse::validation(errors).into_response_with(StatusCode::BAD_REQUEST);
            }
            AuthError::DuplicateEmail => {
                let mut body = ErrorResponse::new("email_in_use", "Email already in use");
                body.errors.push("Email already in use".to_string());
                return body.into_response_with(StatusCode::BAD_REQUEST);
            }
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid credentials",
            ),
            AuthError::InvalidToken | AuthError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or expired token",
            ),
            AuthError::Internal(msg) => {
                log::error!("auth request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    "Server error while processing authentication",
                )
            }
        };

        ErrorResponse::new(error_type, message).into_response_with(status)
    }
}

/// Handler for user registration
///
/// Creates a new user account and returns a session token for it.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered and signed in", body = AuthResponse),
        (status = 400, description = "Validation error or email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), Response> {
    let Json(request) = payload.map_err(rejected_body)?;

    match auth_service.register(request).await {
        Ok(session) => Ok((StatusCode::CREATED, Json(session))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for user login
///
/// Authenticates a user and returns a session token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, Response> {
    let Json(request) = payload.map_err(rejected_body)?;

    match auth_service.login(request).await {
        Ok(session) => Ok(Json(session)),
        Err(e) => Err(e.into_response()),
    }
}
