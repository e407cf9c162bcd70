use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::expense::{
    CreateExpenseRequest, Expense, ExpenseCategory, ExpenseChanges, UpdateExpenseRequest,
};
use crate::models::filters::{ExpenseFilters, ExpenseList, Summary};
use crate::repositories::{ExpenseRepository, RepositoryError};
use crate::validation::{collect_messages, parse_expense_date};

/// Expense service errors
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Expense not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for ExpenseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ExpenseError::NotFound,
            RepositoryError::DatabaseError(msg) => ExpenseError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => ExpenseError::DatabaseError(msg),
        }
    }
}

/// Trait defining expense service operations
#[async_trait]
pub trait ExpenseService: Send + Sync {
    /// Create an expense owned by `user_id`
    async fn create_expense(
        &self,
        user_id: Uuid,
        request: CreateExpenseRequest,
    ) -> Result<Expense, ExpenseError>;

    /// Partially update one of the user's expenses
    async fn update_expense(
        &self,
        user_id: Uuid,
        expense_id: Uuid,
        request: UpdateExpenseRequest,
    ) -> Result<Expense, ExpenseError>;

    /// Delete one of the user's expenses
    async fn delete_expense(&self, user_id: Uuid, expense_id: Uuid) -> Result<(), ExpenseError>;

    /// Filtered expense list, optionally with the whole-history summary
    async fn list_expenses(
        &self,
        user_id: Uuid,
        filters: ExpenseFilters,
        include_summary: bool,
    ) -> Result<ExpenseList, ExpenseError>;

    /// Per-category totals over every expense of the user
    async fn summarize(&self, user_id: Uuid) -> Result<Summary, ExpenseError>;
}

/// Implementation of ExpenseService
pub struct ExpenseServiceImpl {
    expense_repository: Arc<dyn ExpenseRepository>,
}

impl ExpenseServiceImpl {
    pub fn new(expense_repository: Arc<dyn ExpenseRepository>) -> Self {
        Self { expense_repository }
    }
}

fn validation_failed(e: validator::ValidationErrors) -> ExpenseError {
    ExpenseError::Validation(collect_messages(&e))
}

fn parse_category(raw: Option<&str>) -> Option<ExpenseCategory> {
    raw.and_then(|c| c.parse().ok())
}

fn required(field: &str) -> ExpenseError {
    ExpenseError::Validation(vec![format!("{} is required", field)])
}

impl CreateExpenseRequest {
    /// Validates the request and converts it into a new expense owned by `user_id`
    pub fn into_expense(self, user_id: Uuid) -> Result<Expense, ExpenseError> {
        self.validate().map_err(validation_failed)?;

        let amount = self.amount.ok_or_else(|| required("amount"))?;
        let description = self.description.ok_or_else(|| required("description"))?;
        let date = self
            .date
            .as_deref()
            .and_then(parse_expense_date)
            .ok_or_else(|| required("date"))?;
        let category =
            parse_category(self.category.as_deref()).ok_or_else(|| required("category"))?;

        let now = Utc::now();
        Ok(Expense {
            id: Uuid::new_v4(),
            user_id,
            amount,
            description: description.trim().to_string(),
            date,
            category,
            created_at: now,
            updated_at: now,
        })
    }
}

impl UpdateExpenseRequest {
    /// Validates the present fields and converts them into typed changes
    pub fn into_changes(self) -> Result<ExpenseChanges, ExpenseError> {
        self.validate().map_err(validation_failed)?;

        Ok(ExpenseChanges {
            amount: self.amount,
            description: self.description.map(|d| d.trim().to_string()),
            date: self.date.as_deref().and_then(parse_expense_date),
            category: parse_category(self.category.as_deref()),
        })
    }
}

#[async_trait]
impl ExpenseService for ExpenseServiceImpl {
    async fn create_expense(
        &self,
        user_id: Uuid,
        request: CreateExpenseRequest,
    ) -> Result<Expense, ExpenseError> {
        // The owner always comes from the authenticated session, never the body
        let expense = request.into_expense(user_id)?;

        Ok(self.expense_repository.create(expense).await?)
    }

    async fn update_expense(
        &self,
        user_id: Uuid,
        expense_id: Uuid,
        request: UpdateExpenseRequest,
    ) -> Result<Expense, ExpenseError> {
        let changes = request.into_changes()?;

        Ok(self
            .expense_repository
            .update(user_id, expense_id, changes)
            .await?)
    }

    async fn delete_expense(&self, user_id: Uuid, expense_id: Uuid) -> Result<(), ExpenseError> {
        Ok(self.expense_repository.delete(user_id, expense_id).await?)
    }

    async fn list_expenses(
        &self,
        user_id: Uuid,
        filters: ExpenseFilters,
        include_summary: bool,
    ) -> Result<ExpenseList, ExpenseError> {
        let expenses = self
            .expense_repository
            .find_by_user(user_id, &filters)
            .await?;

        // Summary covers the full history; the list filters are not applied to it
        let summary = if include_summary {
            Some(self.summarize(user_id).await?)
        } else {
            None
        };

        Ok(ExpenseList { expenses, summary })
    }

    async fn summarize(&self, user_id: Uuid) -> Result<Summary, ExpenseError> {
        let totals = self.expense_repository.totals_by_category(user_id).await?;
        Ok(Summary::from_totals(totals))
    }
}
