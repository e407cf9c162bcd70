use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::expense::{Expense, ExpenseCategory, ExpenseChanges};
use crate::models::filters::{CategoryTotal, ExpenseFilters};

/// Trait defining expense repository operations.
///
/// Every read and write is scoped by owner: an expense that exists but belongs
/// to someone else is indistinguishable from one that does not exist.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Persist a new expense
    async fn create(&self, expense: Expense) -> Result<Expense, RepositoryError>;

    /// Apply changes to the expense matching both `id` and `user_id`
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Expense, RepositoryError>;

    /// Delete the expense matching both `id` and `user_id`
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError>;

    /// Expenses of a user matching the filters, ordered by date, newest first.
    /// Same-date expenses are ordered by creation time, newest first.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        filters: &ExpenseFilters,
    ) -> Result<Vec<Expense>, RepositoryError>;

    /// Per-category sums over every expense of the user
    async fn totals_by_category(&self, user_id: Uuid)
        -> Result<Vec<CategoryTotal>, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: Uuid,
    user_id: Uuid,
    amount: Decimal,
    description: String,
    date: NaiveDate,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = RepositoryError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<ExpenseCategory>()
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(Expense {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            description: row.description,
            date: row.date,
            category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const EXPENSE_COLUMNS: &str =
    "id, user_id, amount, description, date, category, created_at, updated_at";

/// PostgreSQL implementation of ExpenseRepository
pub struct PostgresExpenseRepository {
    pool: PgPool,
}

impl PostgresExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepository for PostgresExpenseRepository {
    async fn create(&self, expense: Expense) -> Result<Expense, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO expenses ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {cols}
            "#,
            cols = EXPENSE_COLUMNS
        );

        let row = sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(expense.id)
            .bind(expense.user_id)
            .bind(expense.amount)
            .bind(&expense.description)
            .bind(expense.date)
            .bind(expense.category.as_str())
            .bind(expense.created_at)
            .bind(expense.updated_at)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Expense, RepositoryError> {
        // Single statement keyed on (id, user_id); absent changes keep the stored value
        let query = format!(
            r#"
            UPDATE expenses
            SET amount = COALESCE($3, amount),
                description = COALESCE($4, description),
                date = COALESCE($5, date),
                category = COALESCE($6, category),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {cols}
            "#,
            cols = EXPENSE_COLUMNS
        );

        let row = sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(id)
            .bind(user_id)
            .bind(changes.amount)
            .bind(changes.description)
            .bind(changes.date)
            .bind(changes.category.map(|c| c.as_str()))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM expenses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        filters: &ExpenseFilters,
    ) -> Result<Vec<Expense>, RepositoryError> {
        let mut query = format!(
            "SELECT {} FROM expenses WHERE user_id = $1",
            EXPENSE_COLUMNS
        );

        let mut param_count = 1;

        if filters.category.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND category = ${}", param_count));
        }

        if filters.start_date.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND date >= ${}", param_count));
        }

        if filters.end_date.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND date <= ${}", param_count));
        }

        query.push_str(" ORDER BY date DESC, created_at DESC, id DESC");

        // Bind parameters in the same order the conditions were added
        let mut sqlx_query = sqlx::query_as::<_, ExpenseRow>(&query).bind(user_id);

        if let Some(category) = filters.category {
            sqlx_query = sqlx_query.bind(category.as_str());
        }
        if let Some(start_date) = filters.start_date {
            sqlx_query = sqlx_query.bind(start_date);
        }
        if let Some(end_date) = filters.end_date {
            sqlx_query = sqlx_query.bind(end_date);
        }

        sqlx_query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    async fn totals_by_category(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CategoryTotal>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT category, SUM(amount) AS total
            FROM expenses
            WHERE user_id = $1
            GROUP BY category
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(category, total)| {
                let category = category
                    .parse::<ExpenseCategory>()
                    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
                Ok(CategoryTotal { category, total })
            })
            .collect()
    }
}
