use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::handlers::error::ErrorResponse;
use crate::services::auth_service::{AuthError as ServiceAuthError, AuthService};

/// Extension type to store authenticated user ID in request
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Auth middleware that validates bearer tokens and adds the user id to request extensions
pub async fn auth_middleware(
    State(auth_service): State<Arc<dyn AuthService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    // Expired and invalid tokens get the same answer; only the log tells them apart
    let user_id = auth_service.validate_token(token).await.map_err(|e| {
        match e {
            ServiceAuthError::TokenExpired => log::debug!("rejected expired token"),
            other => log::debug!("rejected token: {}", other),
        }
        AuthError::InvalidToken
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}

/// Auth middleware errors
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (error_type, message) = match self {
            AuthError::MissingToken => ("missing_token", "Authentication token missing"),
            AuthError::InvalidToken => ("invalid_token", "Invalid or expired token"),
        };

        ErrorResponse::new(error_type, message).into_response_with(StatusCode::UNAUTHORIZED)
    }
}
