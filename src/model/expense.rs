use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Category, Month};
use crate::Result;
use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// The date format used everywhere dates are written as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single transaction. This is exactly the shape that is persisted and exported.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    pub amount: Amount,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
}

impl Expense {
    pub fn new(
        amount: Amount,
        category: Category,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            category,
            description: description.into(),
            date,
        }
    }

    pub fn month(&self) -> Month {
        Month::of(self.date)
    }
}

/// Identifies one stored expense for editing and deleting.
///
/// Ids live only in memory: they are assigned whenever a record is loaded, imported or created and
/// are never written out, so the persisted and exported shapes stay the four-field records.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// An expense as stored in a project, together with its in-memory id.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(skip)]
    id: ExpenseId,
    #[serde(flatten)]
    expense: Expense,
}

impl Entry {
    pub fn new(expense: Expense) -> Self {
        Self {
            id: ExpenseId::new(),
            expense,
        }
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn expense(&self) -> &Expense {
        &self.expense
    }

    /// Replaces the record while keeping the id.
    pub(crate) fn set_expense(&mut self, expense: Expense) {
        self.expense = expense;
    }
}

/// The raw text of the expense form, before it has been validated.
///
/// New-record mode starts with `ExpenseForm::default()`; edit mode starts from the record being
/// edited via `From<&Expense>`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExpenseForm {
    pub amount: String,
    pub category: Category,
    pub description: String,
    pub date: String,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self {
            amount: String::new(),
            category: Category::ALL[0].clone(),
            description: String::new(),
            date: Local::now().date_naive().format(DATE_FORMAT).to_string(),
        }
    }
}

impl From<&Expense> for ExpenseForm {
    fn from(expense: &Expense) -> Self {
        Self {
            amount: expense.amount.normalized(),
            category: expense.category.clone(),
            description: expense.description.clone(),
            date: expense.date.format(DATE_FORMAT).to_string(),
        }
    }
}

impl ExpenseForm {
    /// Validates the form. An amount that is missing or not a finite number is an
    /// `ErrorType::InvalidAmount`.
    pub fn parse(&self) -> Result<Expense> {
        let amount = Amount::from_str(&self.amount).pub_result(ErrorType::InvalidAmount)?;
        let date = parse_date(&self.date)?;
        Ok(Expense::new(
            amount,
            self.category.clone(),
            self.description.clone(),
            date,
        ))
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .with_context(|| format!("'{s}' is not a date, expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;

    fn form(amount: &str) -> ExpenseForm {
        ExpenseForm {
            amount: amount.to_string(),
            category: Category::Bills,
            description: "rent".to_string(),
            date: "2024-05-01".to_string(),
        }
    }

    #[test]
    fn test_form_parse() {
        let expense = form("950").parse().unwrap();
        assert_eq!(expense.amount, Amount::from_str("950").unwrap());
        assert_eq!(expense.category, Category::Bills);
        assert_eq!(expense.month().to_string(), "2024-05");
    }

    #[test]
    fn test_form_rejects_bad_amounts() {
        for bad in ["", "abc", "NaN", "Infinity", "1.2.3"] {
            let e = form(bad).parse().unwrap_err();
            assert_eq!(error_type(&e), Some(ErrorType::InvalidAmount), "{bad}");
        }
    }

    #[test]
    fn test_form_rejects_bad_date() {
        let mut f = form("1");
        f.date = "05/01/2024".to_string();
        assert!(f.parse().is_err());
    }

    #[test]
    fn test_form_from_expense_round_trip() {
        let expense = form("12.50").parse().unwrap();
        let again = ExpenseForm::from(&expense).parse().unwrap();
        assert_eq!(expense, again);
    }

    #[test]
    fn test_entry_serializes_without_id() {
        let entry = Entry::new(form("3").parse().unwrap());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "amount": 3,
                "category": "Bills",
                "description": "rent",
                "date": "2024-05-01"
            })
        );
    }

    #[test]
    fn test_entries_get_fresh_ids() {
        let a: Entry = serde_json::from_str(
            r#"{"amount":1,"category":"Food","description":"","date":"2024-01-01"}"#,
        )
        .unwrap();
        let b = a.clone();
        let c: Entry = serde_json::from_str(
            r#"{"amount":1,"category":"Food","description":"","date":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }
}
