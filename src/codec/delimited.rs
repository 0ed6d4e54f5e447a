use crate::error::{typed, ErrorType, IntoResult};
use crate::model::{parse_date, Amount, Category, Expense, DATE_FORMAT};
use crate::Result;
use anyhow::Context;
use std::io::Cursor;
use std::str::FromStr;

/// The first line of every delimited export.
pub const HEADER: &str = "Amount,Category,Description,Date";

const FIELD_COUNT: usize = 4;

/// Writes `expenses` as delimited text: the header, then one row per expense joined by `\n`.
///
/// Category and description are always quoted with embedded quotes doubled; amount and date are
/// never quoted.
pub fn encode_delimited(expenses: &[Expense]) -> String {
    let mut lines = Vec::with_capacity(expenses.len() + 1);
    lines.push(HEADER.to_string());
    for expense in expenses {
        lines.push(format!(
            "{},{},{},{}",
            expense.amount.normalized(),
            quote(expense.category.as_str()),
            quote(&expense.description),
            expense.date.format(DATE_FORMAT)
        ));
    }
    lines.join("\n")
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Parses delimited text. The first line is a header and is skipped without being checked.
///
/// Quoted fields may contain commas, doubled quotes and line breaks. Every row must have exactly
/// four fields with a valid amount and date, otherwise the whole input is rejected.
pub fn decode_delimited(text: &str) -> Result<Vec<Expense>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(text.as_bytes()));

    let mut expenses = Vec::new();
    for result in rdr.records() {
        let record = result
            .context("Unable to read delimited text")
            .pub_result(ErrorType::MalformedImport)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() != FIELD_COUNT {
            return Err(typed(
                ErrorType::MalformedImport,
                format!(
                    "Line {line} has {} fields, expected {FIELD_COUNT} ({HEADER})",
                    record.len()
                ),
            ));
        }

        let amount = Amount::from_str(&record[0])
            .with_context(|| format!("Invalid amount on line {line}"))
            .pub_result(ErrorType::InvalidAmount)?;
        let date = parse_date(&record[3])
            .with_context(|| format!("Invalid date on line {line}"))
            .pub_result(ErrorType::MalformedImport)?;
        expenses.push(Expense::new(
            amount,
            Category::from(&record[1]),
            &record[2],
            date,
        ));
    }
    Ok(expenses)
}
