pub mod api_doc;
pub mod app;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod validation;

pub use api_doc::ApiDoc;
pub use app::{AppState, build_router};
pub use config::Config;
