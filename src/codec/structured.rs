use crate::error::{typed, ErrorType, IntoResult};
use crate::model::Expense;
use crate::Result;
use anyhow::Context;
use serde_json::Value;

/// Writes `expenses` as a pretty-printed JSON array of `{amount, category, description, date}`.
pub fn encode_structured(expenses: &[Expense]) -> Result<String> {
    serde_json::to_string_pretty(expenses).context("Unable to serialize expenses to JSON")
}

/// Parses a JSON array of expenses.
///
/// The document is accepted only if it is a non-empty array whose first element has an `amount`
/// field, and every element must then be a valid expense.
pub fn decode_structured(text: &str) -> Result<Vec<Expense>> {
    let value: Value = serde_json::from_str(text)
        .context("Invalid JSON file")
        .pub_result(ErrorType::MalformedImport)?;

    let has_amount = value
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_object)
        .is_some_and(|first| first.contains_key("amount"));
    if !has_amount {
        return Err(typed(
            ErrorType::MalformedImport,
            "Invalid JSON structure, expected an array of expenses",
        ));
    }

    serde_json::from_value(value)
        .context("Invalid JSON structure, an expense does not have the expected fields")
        .pub_result(ErrorType::MalformedImport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, Category};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn expense(amount: &str, category: &str, description: &str, date: &str) -> Expense {
        Expense::new(
            Amount::from_str(amount).unwrap(),
            Category::from(category),
            description,
            NaiveDate::from_str(date).unwrap(),
        )
    }

    #[test]
    fn test_encode_is_pretty() {
        let text = encode_structured(&[expense("10", "Food", "lunch", "2024-03-05")]).unwrap();
        let expected = r#"[
  {
    "amount": 10,
    "category": "Food",
    "description": "lunch",
    "date": "2024-03-05"
  }
]"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_round_trip() {
        let expenses = vec![
            expense("10.25", "Food", "lunch", "2024-03-05"),
            expense("-0.1", "Pets", "refund, \"partial\"", "2024-03-06"),
            expense("1234567.89", "Bills", "line\nbreak", "2023-12-31"),
        ];
        let decoded = decode_structured(&encode_structured(&expenses).unwrap()).unwrap();
        assert_eq!(decoded, expenses);
    }

    #[test]
    fn test_round_trip_keeps_every_digit() {
        let expenses = vec![
            expense("0.123456789012345", "Food", "", "2024-03-05"),
            expense("1234567.89123456", "Bills", "", "2024-03-06"),
            expense("-999999999999.999", "Other", "", "2024-03-07"),
        ];
        let decoded = decode_structured(&encode_structured(&expenses).unwrap()).unwrap();
        assert_eq!(decoded, expenses);
        for (a, b) in decoded.iter().zip(&expenses) {
            assert_eq!(a.amount.normalized(), b.amount.normalized());
        }
    }

    #[test]
    fn test_out_of_range_amount_is_rejected() {
        for amount in ["5e28", "0.12345678901234567891"] {
            let text = format!(
                r#"[{{"amount": {amount}, "category": "Food", "description": "", "date": "2024-01-01"}}]"#
            );
            let e = decode_structured(&text).unwrap_err();
            assert_eq!(error_type(&e), Some(ErrorType::MalformedImport), "{amount}");
        }
    }

    #[test]
    fn test_syntax_error() {
        let e = decode_structured("[{\"amount\": 1,").unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::MalformedImport));
        assert!(format!("{e:#}").contains("Invalid JSON file"));
    }

    #[test]
    fn test_shape_errors() {
        for text in [
            "{}",
            "[]",
            "[1, 2]",
            "[{\"category\": \"Food\"}]",
            "\"just a string\"",
        ] {
            let e = decode_structured(text).unwrap_err();
            assert_eq!(error_type(&e), Some(ErrorType::MalformedImport), "{text}");
            assert!(format!("{e:#}").contains("Invalid JSON structure"), "{text}");
        }
    }

    #[test]
    fn test_later_record_with_wrong_shape() {
        let text = r#"[
            {"amount": 1, "category": "Food", "description": "", "date": "2024-01-01"},
            {"amount": "x", "category": "Food", "description": "", "date": "2024-01-01"}
        ]"#;
        assert!(decode_structured(text).is_err());
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let text = r#"[{"amount": 3.5, "category": "Other", "date": "2024-01-02"}]"#;
        let expenses = decode_structured(text).unwrap();
        assert_eq!(expenses, vec![expense("3.5", "Other", "", "2024-01-02")]);
    }
}
