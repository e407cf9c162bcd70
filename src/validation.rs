use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de::Error as _};
use std::str::FromStr;
use validator::{ValidationError, ValidationErrors};

use crate::models::expense::ExpenseCategory;

/// Smallest accepted expense amount (0.01)
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub const MAX_DESCRIPTION_CHARS: usize = 200;

pub const MAX_NAME_CHARS: usize = 80;

fn error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Validates that an amount is positive and at least 0.01
pub fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(error(
            "invalid_amount",
            "amount must be a positive number".to_string(),
        ));
    }
    if *amount < MIN_AMOUNT {
        return Err(error(
            "invalid_amount",
            format!("amount must be at least {}", MIN_AMOUNT),
        ));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(error(
            "invalid_description",
            "description must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(error(
            "invalid_description",
            format!(
                "description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            ),
        ));
    }
    Ok(())
}

pub fn validate_expense_date(date: &str) -> Result<(), ValidationError> {
    parse_expense_date(date)
        .map(|_| ())
        .ok_or_else(|| error("invalid_date", "date must be a valid date".to_string()))
}

pub fn validate_category(category: &str) -> Result<(), ValidationError> {
    category.parse::<ExpenseCategory>().map(|_| ()).map_err(|_| {
        error(
            "invalid_category",
            format!(
                "category must be one of: {}",
                ExpenseCategory::allowed_names()
            ),
        )
    })
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(error("invalid_name", "Name is required".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(error(
            "invalid_name",
            format!("Name must be at most {} characters", MAX_NAME_CHARS),
        ));
    }
    Ok(())
}

/// Parses a calendar date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
/// Timestamps keep the date as written, without converting to UTC.
pub fn parse_expense_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Reads an optional amount that must be a JSON number. Numeric strings such
/// as `"42.50"` are rejected.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Some)
        .map_err(|_| D::Error::custom("amount must be a positive number"))
}

/// Flattens validator output into user-facing messages, ordered by field name
pub fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), ValidationError>) -> String {
        result.unwrap_err().message.unwrap().to_string()
    }

    #[test]
    fn test_amount_boundaries() {
        assert!(validate_amount(&Decimal::from_str("0.01").unwrap()).is_ok());
        assert!(validate_amount(&Decimal::from_str("42.50").unwrap()).is_ok());

        assert_eq!(
            message(validate_amount(&Decimal::ZERO)),
            "amount must be a positive number"
        );
        assert_eq!(
            message(validate_amount(&Decimal::from_str("-5").unwrap())),
            "amount must be a positive number"
        );
        assert_eq!(
            message(validate_amount(&Decimal::from_str("0.009").unwrap())),
            "amount must be at least 0.01"
        );
    }

    #[test]
    fn test_description_rules() {
        assert!(validate_description("Taxi").is_ok());
        assert!(validate_description(&"x".repeat(200)).is_ok());
        assert_eq!(
            message(validate_description("   ")),
            "description must not be empty"
        );
        assert_eq!(
            message(validate_description(&"x".repeat(201))),
            "description must be at most 200 characters"
        );
    }

    #[test]
    fn test_date_formats() {
        let march_first = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_expense_date("2024-03-01"), march_first);
        assert_eq!(parse_expense_date("2024-03-01T18:30:00Z"), march_first);
        assert_eq!(parse_expense_date("2024-03-01T23:30:00-05:00"), march_first);
        assert_eq!(parse_expense_date("2024-02-30"), None);
        assert_eq!(parse_expense_date("not a date"), None);
        assert_eq!(
            message(validate_expense_date("13/45/2024")),
            "date must be a valid date"
        );
    }

    #[test]
    fn test_category_message_names_allowed_set() {
        assert!(validate_category("Shopping").is_ok());
        assert_eq!(
            message(validate_category("Rent")),
            "category must be one of: Food, Travel, Shopping, Bills, Other"
        );
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Jane").is_ok());
        assert_eq!(message(validate_name("  ")), "Name is required");
        assert_eq!(
            message(validate_name(&"n".repeat(81))),
            "Name must be at most 80 characters"
        );
    }
}
