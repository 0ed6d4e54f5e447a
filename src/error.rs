//! Error handling for the expense tracker.
//!
//! Internally everything is an `anyhow::Error`. Errors that a user needs to be able to tell apart
//! carry an `ErrorType` as context, which can be recovered with `error_type`.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of failure that are surfaced to the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// An amount that is not a finite number was entered or imported.
    InvalidAmount,
    /// An import file could not be parsed or did not have the expected shape.
    MalformedImport,
    /// An import is waiting for its file contents; other mutations are rejected until it is done.
    ImportPending,
    /// A project or expense that was referred to does not exist.
    NotFound,
    /// The configuration or home directory is missing or invalid.
    Config,
    /// Reading from or writing to durable storage failed.
    Storage,
}

serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The text shown at the front of an error message, e.g. `Malformed import file: Line 3 ...`.
impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorType::InvalidAmount => "Invalid amount",
            ErrorType::MalformedImport => "Malformed import file",
            ErrorType::ImportPending => "An import is in progress",
            ErrorType::NotFound => "Not found",
            ErrorType::Config => "Configuration problem",
            ErrorType::Storage => "Storage failure",
        };
        f.write_str(text)
    }
}

/// Tags a result's error with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Creates a new error of the given type with a message underneath it.
pub(crate) fn typed(error_type: ErrorType, message: impl Into<String>) -> Error {
    anyhow::anyhow!(message.into()).context(error_type)
}

/// Returns the outermost `ErrorType` attached to `e`, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn test_error_type_round_trips_through_anyhow() {
        let result: std::result::Result<(), Error> = Err(anyhow!("bad row"));
        let e = result.pub_result(ErrorType::MalformedImport).unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::MalformedImport));
        assert_eq!(e.to_string(), "Malformed import file");
        assert_eq!(format!("{e:#}"), "Malformed import file: bad row");
    }

    #[test]
    fn test_chain_reads_as_a_sentence() {
        let result: std::result::Result<(), Error> = Err(anyhow!("disk full"));
        let e = result
            .pub_result(ErrorType::Storage)
            .context("Unable to save")
            .unwrap_err();
        let text = format!("{e:#}");
        assert_eq!(text, "Unable to save: Storage failure: disk full");
        assert!(!text.contains("storage"));
        assert_eq!(error_type(&e), Some(ErrorType::Storage));
    }

    #[test]
    fn test_serialized_name_is_snake_case() {
        assert_eq!(
            serde_plain::to_string(&ErrorType::ImportPending).unwrap(),
            "import_pending"
        );
        assert_eq!(
            "not_found".parse::<ErrorType>().unwrap(),
            ErrorType::NotFound
        );
    }

    #[test]
    fn test_untyped_error() {
        let e = anyhow!("plain");
        assert_eq!(error_type(&e), None);
    }

    #[test]
    fn test_typed() {
        let e = typed(ErrorType::InvalidAmount, "not a number: 'abc'");
        assert_eq!(error_type(&e), Some(ErrorType::InvalidAmount));
    }
}
