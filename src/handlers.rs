pub mod auth_handlers;
pub mod error;
pub mod expense_handlers;

pub use error::ErrorResponse;
