use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::user::{PublicUser, normalize_email};

/// Request payload for user login
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "email": "jane.doe@example.com",
    "password": "secret123"
}))]
pub struct LoginRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

impl LoginRequest {
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

/// Token plus public user view, returned by signup and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
    "expiresAt": "2024-03-08T12:00:00Z",
    "user": {
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "name": "Jane Doe",
        "email": "jane.doe@example.com"
    }
}))]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: PublicUser,
}
