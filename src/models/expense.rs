use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{
    deserialize_amount, validate_amount, validate_category, validate_description,
    validate_expense_date,
};

/// Fixed set of expense categories shared with the mobile client
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum ExpenseCategory {
    Food,
    Travel,
    Shopping,
    Bills,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Food,
        ExpenseCategory::Travel,
        ExpenseCategory::Shopping,
        ExpenseCategory::Bills,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Bills => "Bills",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Comma separated list of the allowed names, used in validation messages
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown expense category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for ExpenseCategory {
    type Err = UnknownCategory;

    /// Matching is exact: "food" is not "Food".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Expense record owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = f64, minimum = 0.01, example = 42.50)]
    pub amount: Decimal,
    pub description: String,
    #[schema(format = "date", example = "2024-03-01")]
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating an expense.
///
/// Fields are optional at the serde level so that a missing field is reported
/// as a validation message instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "amount": 42.50,
    "description": "Taxi",
    "date": "2024-03-01",
    "category": "Travel"
}))]
pub struct CreateExpenseRequest {
    #[validate(
        required(message = "amount is required"),
        custom(function = "validate_amount")
    )]
    #[serde(default, deserialize_with = "deserialize_amount")]
    #[schema(value_type = f64, minimum = 0.01)]
    pub amount: Option<Decimal>,

    #[validate(
        required(message = "description is required"),
        custom(function = "validate_description")
    )]
    #[schema(max_length = 200)]
    pub description: Option<String>,

    #[validate(
        required(message = "date is required"),
        custom(function = "validate_expense_date")
    )]
    #[schema(format = "date")]
    pub date: Option<String>,

    #[validate(
        required(message = "category is required"),
        custom(function = "validate_category")
    )]
    pub category: Option<String>,
}

/// Request payload for a partial expense update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "amount": 45.00,
    "category": "Food"
}))]
pub struct UpdateExpenseRequest {
    #[validate(custom(function = "validate_amount"))]
    #[serde(default, deserialize_with = "deserialize_amount")]
    #[schema(value_type = Option<f64>, minimum = 0.01)]
    pub amount: Option<Decimal>,

    #[validate(custom(function = "validate_description"))]
    #[schema(max_length = 200)]
    pub description: Option<String>,

    #[validate(custom(function = "validate_expense_date"))]
    #[schema(format = "date")]
    pub date: Option<String>,

    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,
}

/// Validated field changes applied by an update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
}

impl ExpenseChanges {
    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(description) = &self.description {
            expense.description = description.clone();
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
    }
}
