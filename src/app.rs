use axum::{
    Json, Router,
    extract::FromRef,
    middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, timeout::TimeoutLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;

use crate::handlers::auth_handlers::{login_handler, register_handler};
use crate::handlers::expense_handlers::{
    create_expense_handler, delete_expense_handler, list_expenses_handler,
    update_expense_handler,
};
use crate::middleware::{auth_middleware, log_requests};
use crate::services::{AuthService, ExpenseService};

/// Services shared by every request; handlers extract the one they need
#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub expense_service: Arc<dyn ExpenseService>,
}

/// Builds the full HTTP surface, API docs included, with its middleware stack
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let expense_routes = Router::new()
        .route("/", get(list_expenses_handler).post(create_expense_handler))
        .route("/:id", put(update_expense_handler).delete(delete_expense_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/auth/signup", post(register_handler))
        .route("/auth/login", post(login_handler))
        .nest("/expenses", expense_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_requests))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Expense API is running" }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
