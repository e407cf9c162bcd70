use axum::{
    Json,
    extract::{
        Extension, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::error::{ErrorResponse, rejected_body};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::expense::{CreateExpenseRequest, Expense, UpdateExpenseRequest};
use crate::models::filters::{ExpenseList, ListExpensesQuery};
use crate::services::expense_service::{ExpenseError, ExpenseService};

/// Convert ExpenseError to HTTP response
impl IntoResponse for ExpenseError {
    fn into_response(self) -> Response {
        match self {
            ExpenseError::Validation(errors) => {
                ErrorResponse::validation(errors).into_response_with(StatusCode::BAD_REQUEST)
            }
            ExpenseError::NotFound => ErrorResponse::new("not_found", "Expense not found")
                .into_response_with(StatusCode::NOT_FOUND),
            ExpenseError::DatabaseError(msg) => {
                log::error!("expense request failed: {}", msg);
                ErrorResponse::new("server_error", "Server error while processing expenses")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// An id that is not a UUID cannot name an expense the caller owns
fn expense_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, Response> {
    path.map(|Path(id)| id)
        .map_err(|_| ExpenseError::NotFound.into_response())
}

/// Handler for listing expenses
///
/// Returns the authenticated user's expenses matching the optional filters,
/// newest first. With `includeSummary=true` the response also carries totals
/// per category computed over the user's entire history, whatever the filters.
#[utoipa::path(
    get,
    path = "/expenses",
    params(ListExpensesQuery),
    responses(
        (status = 200, description = "Filtered expenses and optional summary", body = ExpenseList),
        (status = 400, description = "Invalid filter value", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "expenses"
)]
pub async fn list_expenses_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    query: Result<Query<ListExpensesQuery>, QueryRejection>,
) -> Result<Json<ExpenseList>, Response> {
    let Query(query) = query.map_err(|rejection| {
        ErrorResponse::validation(vec![rejection.body_text()])
            .into_response_with(StatusCode::BAD_REQUEST)
    })?;

    let (filters, include_summary) = query
        .parse()
        .map_err(|errors| ExpenseError::Validation(errors).into_response())?;

    match expense_service
        .list_expenses(auth_user.user_id, filters, include_summary)
        .await
    {
        Ok(list) => Ok(Json(list)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating an expense
///
/// Creates a new expense owned by the authenticated user.
#[utoipa::path(
    post,
    path = "/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense created", body = Expense),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "expenses"
)]
pub async fn create_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), Response> {
    let Json(request) = payload.map_err(rejected_body)?;

    match expense_service
        .create_expense(auth_user.user_id, request)
        .await
    {
        Ok(expense) => Ok((StatusCode::CREATED, Json(expense))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating an expense
///
/// Applies the fields present in the body; absent fields keep their value.
#[utoipa::path(
    put,
    path = "/expenses/{id}",
    params(
        ("id" = Uuid, Path, description = "Expense ID")
    ),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Expense updated", body = Expense),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "expenses"
)]
pub async fn update_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateExpenseRequest>, JsonRejection>,
) -> Result<Json<Expense>, Response> {
    let expense_id = expense_id(path)?;
    let Json(request) = payload.map_err(rejected_body)?;

    match expense_service
        .update_expense(auth_user.user_id, expense_id, request)
        .await
    {
        Ok(expense) => Ok(Json(expense)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting an expense
#[utoipa::path(
    delete,
    path = "/expenses/{id}",
    params(
        ("id" = Uuid, Path, description = "Expense ID")
    ),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "expenses"
)]
pub async fn delete_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, Response> {
    let expense_id = expense_id(path)?;

    match expense_service
        .delete_expense(auth_user.user_id, expense_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
