pub mod auth_middleware;
pub mod request_logger;

pub use auth_middleware::{AuthenticatedUser, auth_middleware};
pub use request_logger::log_requests;
