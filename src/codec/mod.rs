//! Converts expense lists to and from the two file formats: delimited text (CSV) and structured
//! text (JSON).
//!
//! Decoding is all-or-nothing. Either every record of the input is returned or an error tagged
//! `ErrorType::MalformedImport` (or `ErrorType::InvalidAmount`) is, so a failed import can never
//! leave a project half replaced.

mod delimited;
mod structured;

use crate::model::Expense;
use crate::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use delimited::{decode_delimited, encode_delimited, HEADER};
pub use structured::{decode_structured, encode_structured};

/// The two supported file formats.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Json,
}

serde_plain::derive_display_from_serialize!(Format);
serde_plain::derive_fromstr_from_deserialize!(Format);

impl Format {
    /// Guesses the format from content. File names are not consulted: text that starts with `[`
    /// or `{` is JSON and anything else is CSV.
    pub fn detect(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('[') | Some('{') => Format::Json,
            _ => Format::Csv,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }

    pub fn encode(&self, expenses: &[Expense]) -> Result<String> {
        match self {
            Format::Csv => Ok(encode_delimited(expenses)),
            Format::Json => encode_structured(expenses),
        }
    }

    pub fn decode(&self, text: &str) -> Result<Vec<Expense>> {
        match self {
            Format::Csv => decode_delimited(text),
            Format::Json => decode_structured(text),
        }
    }
}

/// The default export file name for a project, e.g. `Summer_Trip_expenses.csv`.
pub fn export_file_name(project_name: &str, format: Format) -> String {
    let stem = project_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}_expenses.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Format::detect("  \n[ {\"amount\": 1} ]"), Format::Json);
        assert_eq!(Format::detect("{}"), Format::Json);
        assert_eq!(Format::detect("Amount,Category,Description,Date"), Format::Csv);
        assert_eq!(Format::detect(""), Format::Csv);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("Summer  Trip\t2024", Format::Csv),
            "Summer_Trip_2024_expenses.csv"
        );
        assert_eq!(export_file_name("Home", Format::Json), "Home_expenses.json");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("csv".parse::<Format>().unwrap(), Format::Csv);
        assert_eq!(Format::Json.to_string(), "json");
    }
}
