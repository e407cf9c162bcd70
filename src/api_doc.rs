use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::ErrorResponse;
use crate::models::{
    AuthResponse, CreateExpenseRequest, CreateUserRequest, Expense, ExpenseCategory,
    ExpenseList, LoginRequest, PublicUser, Summary, UpdateExpenseRequest,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth_handlers::register_handler,
        crate::handlers::auth_handlers::login_handler,
        crate::handlers::expense_handlers::list_expenses_handler,
        crate::handlers::expense_handlers::create_expense_handler,
        crate::handlers::expense_handlers::update_expense_handler,
        crate::handlers::expense_handlers::delete_expense_handler,
    ),
    components(
        schemas(
            CreateUserRequest, LoginRequest, AuthResponse, PublicUser,
            Expense, ExpenseCategory, CreateExpenseRequest, UpdateExpenseRequest,
            ExpenseList, Summary, ErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup and login"),
        (name = "expenses", description = "Expense records and summaries")
    ),
    info(
        title = "Expense Tracker API",
        version = "0.1.0",
        description = "REST API for recording personal expenses",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
