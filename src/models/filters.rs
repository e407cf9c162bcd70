use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use super::expense::{Expense, ExpenseCategory};
use crate::validation::parse_expense_date;

/// Optional, independent list filters. Both date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilters {
    pub category: Option<ExpenseCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ExpenseFilters {
    pub fn matches(&self, expense: &Expense) -> bool {
        self.category.map_or(true, |c| expense.category == c)
            && self.start_date.map_or(true, |start| expense.date >= start)
            && self.end_date.map_or(true, |end| expense.date <= end)
    }
}

/// Raw query string of `GET /expenses`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListExpensesQuery {
    /// Exact category name
    pub category: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    pub end_date: Option<String>,
    /// `true` to attach the whole-history summary
    pub include_summary: Option<String>,
}

impl ListExpensesQuery {
    /// Splits the query into typed filters and the summary flag.
    /// Empty parameters are treated as absent.
    pub fn parse(self) -> Result<(ExpenseFilters, bool), Vec<String>> {
        let mut errors = Vec::new();

        let category = match non_empty(self.category) {
            Some(raw) => match raw.parse::<ExpenseCategory>() {
                Ok(category) => Some(category),
                Err(_) => {
                    errors.push(format!(
                        "category must be one of: {}",
                        ExpenseCategory::allowed_names()
                    ));
                    None
                }
            },
            None => None,
        };

        let mut date_param = |raw: Option<String>, name: &str| match non_empty(raw) {
            Some(raw) => {
                let parsed = parse_expense_date(&raw);
                if parsed.is_none() {
                    errors.push(format!("{} must be a valid date", name));
                }
                parsed
            }
            None => None,
        };
        let start_date = date_param(self.start_date, "startDate");
        let end_date = date_param(self.end_date, "endDate");

        if !errors.is_empty() {
            return Err(errors);
        }

        let include_summary = self.include_summary.as_deref() == Some("true");

        Ok((
            ExpenseFilters {
                category,
                start_date,
                end_date,
            },
            include_summary,
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Sum of a user's expenses in one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Decimal,
}

/// Whole-history totals per category. Never reflects list filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[schema(value_type = Object, example = json!({"Food": 12.5, "Travel": 42.5}))]
    pub per_category: BTreeMap<ExpenseCategory, Decimal>,
    #[schema(value_type = f64, example = 55.0)]
    pub total: Decimal,
}

impl Summary {
    /// The grand total is the sum of the per-category totals, so the two always agree.
    pub fn from_totals(totals: impl IntoIterator<Item = CategoryTotal>) -> Self {
        let mut per_category = BTreeMap::new();
        for CategoryTotal { category, total } in totals {
            *per_category.entry(category).or_insert(Decimal::ZERO) += total;
        }
        let total = per_category.values().copied().sum();
        Self {
            per_category,
            total,
        }
    }
}

/// Response body of `GET /expenses`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseList {
    pub expenses: Vec<Expense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>, start: Option<&str>, end: Option<&str>) -> ListExpensesQuery {
        ListExpensesQuery {
            category: category.map(String::from),
            start_date: start.map(String::from),
            end_date: end.map(String::from),
            include_summary: None,
        }
    }

    #[test]
    fn test_parse_empty_query() {
        let (filters, include_summary) = ListExpensesQuery::default().parse().unwrap();
        assert_eq!(filters, ExpenseFilters::default());
        assert!(!include_summary);
    }

    #[test]
    fn test_parse_full_query() {
        let mut q = query(Some("Food"), Some("2024-01-01"), Some("2024-01-31"));
        q.include_summary = Some("true".to_string());

        let (filters, include_summary) = q.parse().unwrap();
        assert_eq!(filters.category, Some(ExpenseCategory::Food));
        assert_eq!(filters.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filters.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert!(include_summary);
    }

    #[test]
    fn test_include_summary_requires_literal_true() {
        for raw in ["1", "yes", "TRUE", "false"] {
            let q = ListExpensesQuery {
                include_summary: Some(raw.to_string()),
                ..Default::default()
            };
            let (_, include_summary) = q.parse().unwrap();
            assert!(!include_summary, "'{}' should not enable the summary", raw);
        }
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        let errors = query(Some("Groceries"), Some("yesterday"), None)
            .parse()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Food, Travel, Shopping, Bills, Other"));
        assert_eq!(errors[1], "startDate must be a valid date");
    }

    #[test]
    fn test_summary_total_is_sum_of_categories() {
        let summary = Summary::from_totals(vec![
            CategoryTotal {
                category: ExpenseCategory::Food,
                total: Decimal::new(1250, 2),
            },
            CategoryTotal {
                category: ExpenseCategory::Travel,
                total: Decimal::new(4250, 2),
            },
        ]);

        assert_eq!(summary.per_category.len(), 2);
        assert_eq!(summary.total, Decimal::new(5500, 2));
        assert_eq!(
            summary.per_category.values().copied().sum::<Decimal>(),
            summary.total
        );
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = Summary::from_totals(Vec::new());
        assert!(summary.per_category.is_empty());
        assert_eq!(summary.total, Decimal::ZERO);
    }
}
