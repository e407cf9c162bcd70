use async_trait::async_trait;
use bcrypt::{hash, verify};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::{AuthResponse, LoginRequest};
use crate::models::user::{CreateUserRequest, NewUser, PublicUser, User};
use crate::repositories::{RepositoryError, UserRepository};
use crate::services::token_service::{TokenError, TokenService};
use crate::validation::collect_messages;

/// bcrypt work factor for stored passwords
pub const PASSWORD_HASH_COST: u32 = 10;

/// Authentication service errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::ConstraintViolation(_) => AuthError::DuplicateEmail,
            e => AuthError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Encoding(msg) => AuthError::Internal(msg),
        }
    }
}

/// Trait defining authentication service operations
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and sign them in
    async fn register(&self, request: CreateUserRequest) -> Result<AuthResponse, AuthError>;

    /// Authenticate user and return a session token
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError>;

    /// Validate a session token and return the user id it carries
    async fn validate_token(&self, token: &str) -> Result<Uuid, AuthError>;
}

/// Implementation of AuthService
pub struct AuthServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    token_service: Arc<TokenService>,
}

impl AuthServiceImpl {
    pub fn new(user_repository: Arc<dyn UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repository,
            token_service,
        }
    }

    /// Hash a password using bcrypt, off the async executor
    async fn hash_password(password: String) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || hash(password, PASSWORD_HASH_COST))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a hash
    async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || verify(password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| AuthError::Internal(format!("Password verification failed: {}", e)))
    }

    fn session_for(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let issued = self.token_service.issue(user.id)?;
        Ok(AuthResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user: PublicUser::from(user),
        })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: CreateUserRequest) -> Result<AuthResponse, AuthError> {
        let request = request.normalized();
        request
            .validate()
            .map_err(|e| AuthError::Validation(collect_messages(&e)))?;

        // Fast path only; the store's uniqueness check below is authoritative
        if self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = Self::hash_password(request.password).await?;

        let user = self
            .user_repository
            .create(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
            })
            .await?;

        log::info!("registered user {}", user.id);
        self.session_for(&user)
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let request = request.normalized();
        request
            .validate()
            .map_err(|e| AuthError::Validation(collect_messages(&e)))?;

        // Unknown email and wrong password are reported the same way
        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = Self::verify_password(request.password, user.password_hash.clone()).await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.session_for(&user)
    }

    async fn validate_token(&self, token: &str) -> Result<Uuid, AuthError> {
        Ok(self.token_service.verify(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryUserRepository;
    use chrono::Duration;

    fn create_service() -> AuthServiceImpl {
        let repo = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(TokenService::new("test_secret", Duration::days(7)));
        AuthServiceImpl::new(repo, tokens)
    }

    fn signup(email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: Some("Test User".to_string()),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Store that accepts any lookup as "absent" but rejects every insert as a duplicate,
    /// standing in for a concurrent registration winning the race.
    struct RacingUserRepository;

    #[async_trait]
    impl UserRepository for RacingUserRepository {
        async fn create(&self, _user: NewUser) -> Result<User, RepositoryError> {
            Err(RepositoryError::ConstraintViolation(
                "users_email_key".to_string(),
            ))
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
            Ok(None)
        }
    }

    struct BrokenUserRepository;

    #[async_trait]
    impl UserRepository for BrokenUserRepository {
        async fn create(&self, _user: NewUser) -> Result<User, RepositoryError> {
            Err(RepositoryError::DatabaseError("connection refused".to_string()))
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
            Err(RepositoryError::DatabaseError("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let service = create_service();

        let response = service
            .register(signup("test@example.com", "password123"))
            .await
            .unwrap();

        assert!(!response.token.is_empty());
        assert_eq!(response.user.name.as_deref(), Some("Test User"));
        assert_eq!(response.user.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_register_normalizes_email_and_name() {
        let service = create_service();
        let mut request = signup("  Mixed.Case@Example.COM ", "password123");
        request.name = Some("  Jane  ".to_string());

        let response = service.register(request).await.unwrap();

        assert_eq!(response.user.email, "mixed.case@example.com");
        assert_eq!(response.user.name.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn test_register_then_login_returns_same_user() {
        let service = create_service();

        let registered = service
            .register(signup("test@example.com", "password123"))
            .await
            .unwrap();
        let logged_in = service
            .login(login("TEST@example.com", "password123"))
            .await
            .unwrap();

        assert_eq!(registered.user.id, logged_in.user.id);
        assert_eq!(
            service.validate_token(&logged_in.token).await.unwrap(),
            registered.user.id
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email_case_insensitive() {
        let service = create_service();

        service
            .register(signup("test@example.com", "password123"))
            .await
            .unwrap();

        let result = service
            .register(signup("Test@Example.com", "different-password"))
            .await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_register_store_conflict_is_duplicate_email() {
        let tokens = Arc::new(TokenService::new("test_secret", Duration::days(7)));
        let service = AuthServiceImpl::new(Arc::new(RacingUserRepository), tokens);

        let result = service
            .register(signup("test@example.com", "password123"))
            .await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let service = create_service();

        let request = CreateUserRequest {
            name: Some("   ".to_string()),
            email: "not-an-email".to_string(),
            password: "12345".to_string(),
        };

        match service.register(request).await {
            Err(AuthError::Validation(messages)) => {
                assert_eq!(
                    messages,
                    vec![
                        "Valid email is required".to_string(),
                        "Name is required".to_string(),
                        "Password must be at least 6 characters long".to_string(),
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_requires_name() {
        let service = create_service();
        let mut request = signup("test@example.com", "password123");
        request.name = None;

        let result = service.register(request).await;
        assert!(matches!(result, Err(AuthError::Validation(m)) if m == vec!["Name is required"]));
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_the_same() {
        let service = create_service();
        service
            .register(signup("test@example.com", "password123"))
            .await
            .unwrap();

        let wrong_password = service.login(login("test@example.com", "wrongpassword")).await;
        let unknown_email = service.login(login("nobody@example.com", "password123")).await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(TokenService::new("test_secret", Duration::days(7)));
        let service = AuthServiceImpl::new(repo.clone(), tokens);

        service
            .register(signup("test@example.com", "password123"))
            .await
            .unwrap();

        let stored = repo.find_by_email("test@example.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "password123");
        assert!(verify("password123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let tokens = Arc::new(TokenService::new("test_secret", Duration::days(7)));
        let service = AuthServiceImpl::new(Arc::new(BrokenUserRepository), tokens);

        let result = service.login(login("test@example.com", "password123")).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_unissuable_token_is_internal_error() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(TokenService::new("test_secret", Duration::MAX));
        let service = AuthServiceImpl::new(repo, tokens);

        let result = service
            .register(signup("test@example.com", "password123"))
            .await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_validate_token_invalid() {
        let service = create_service();

        let result = service.validate_token("invalid_token").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
