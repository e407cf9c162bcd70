pub mod expense_repository;
pub mod memory;
pub mod user_repository;

pub use expense_repository::{ExpenseRepository, PostgresExpenseRepository};
pub use memory::{InMemoryExpenseRepository, InMemoryUserRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};

/// Repository errors for store operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Resource not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::ConstraintViolation(db_err.to_string())
            }
            e => RepositoryError::DatabaseError(e.to_string()),
        }
    }
}
