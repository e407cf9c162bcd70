//! In-process stores used when no database is configured, and by the tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ExpenseRepository, RepositoryError, UserRepository};
use crate::models::expense::{Expense, ExpenseChanges};
use crate::models::filters::{CategoryTotal, ExpenseFilters, Summary};
use crate::models::user::{NewUser, User};

/// Users keyed by email, so the map itself enforces email uniqueness
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.email) {
            return Err(RepositoryError::ConstraintViolation(
                "Email already exists".to_string(),
            ));
        }

        let new_user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };

        users.insert(new_user.email.clone(), new_user.clone());
        Ok(new_user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}

/// Expenses kept in insertion order
#[derive(Default)]
pub struct InMemoryExpenseRepository {
    expenses: RwLock<Vec<Expense>>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn create(&self, expense: Expense) -> Result<Expense, RepositoryError> {
        let mut expenses = self.expenses.write().await;

        if expenses.iter().any(|e| e.id == expense.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Expense {} already exists",
                expense.id
            )));
        }

        expenses.push(expense.clone());
        Ok(expense)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Expense, RepositoryError> {
        let mut expenses = self.expenses.write().await;

        let expense = expenses
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;

        changes.apply_to(expense);
        expense.updated_at = Utc::now();
        Ok(expense.clone())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let mut expenses = self.expenses.write().await;

        let position = expenses
            .iter()
            .position(|e| e.id == id && e.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;

        expenses.remove(position);
        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        filters: &ExpenseFilters,
    ) -> Result<Vec<Expense>, RepositoryError> {
        let expenses = self.expenses.read().await;

        // Walk newest insertions first so the stable sort keeps creation order
        // (newest first) among equal dates and timestamps
        let mut matching: Vec<Expense> = expenses
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id && filters.matches(e))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(matching)
    }

    async fn totals_by_category(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CategoryTotal>, RepositoryError> {
        let expenses = self.expenses.read().await;

        let summary = Summary::from_totals(
            expenses
                .iter()
                .filter(|e| e.user_id == user_id)
                .map(|e| CategoryTotal {
                    category: e.category,
                    total: e.amount,
                }),
        );

        Ok(summary
            .per_category
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect())
    }
}
