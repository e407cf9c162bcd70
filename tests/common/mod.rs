// Helpers are shared by test files that are compiled separately
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use expense_tracker::repositories::{InMemoryExpenseRepository, InMemoryUserRepository};
use expense_tracker::services::{AuthServiceImpl, ExpenseServiceImpl, TokenService};
use expense_tracker::{AppState, build_router};

pub const TEST_SECRET: &str = "integration_test_secret";

/// Builds the full application on in-memory stores
pub fn test_app() -> Router {
    test_app_with_lifetime(Duration::days(7))
}

pub fn test_app_with_lifetime(lifetime: Duration) -> Router {
    let tokens = Arc::new(TokenService::new(TEST_SECRET, lifetime));
    let state = AppState {
        auth_service: Arc::new(AuthServiceImpl::new(
            Arc::new(InMemoryUserRepository::new()),
            tokens,
        )),
        expense_service: Arc::new(ExpenseServiceImpl::new(Arc::new(
            InMemoryExpenseRepository::new(),
        ))),
    };
    build_router(state, std::time::Duration::from_secs(30))
}

/// Sends a request and returns the status with the parsed body (`Null` when empty)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

/// Registers a user and returns the signup response body
pub async fn signup(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "name": "Test User", "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body
}

/// Registers a user and returns its token
pub async fn signup_token(app: &Router, email: &str) -> String {
    let body = signup(app, email, "password123").await;
    body["token"].as_str().unwrap().to_string()
}

/// Creates an expense and returns the stored record
pub async fn create_expense(
    app: &Router,
    token: &str,
    amount: f64,
    description: &str,
    date: &str,
    category: &str,
) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/expenses",
        Some(token),
        Some(json!({
            "amount": amount,
            "description": description,
            "date": date,
            "category": category,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}

pub fn ids(list: &Value) -> Vec<String> {
    list["expenses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["_id"].as_str().unwrap().to_string())
        .collect()
}
