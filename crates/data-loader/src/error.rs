//! Error types for the data-loader crate.
//!
//! Two families of errors live here:
//! - `DataLoadError` for everything that can go wrong while reading a ratings file
//! - `UnknownUserError` for queries naming a user the store has never seen

use thiserror::Error;

use crate::types::UserId;

/// Errors that can occur during data loading and parsing
///
/// The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
/// and `Display` from the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The document is not valid JSON or does not have the
    /// `{ user: { item: rating } }` shape
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A rating had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// A query named a user that is not in the rating store.
///
/// Returned instead of silently defaulting, so callers must decide what
/// an unknown user means for them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot find user '{user_id}' in the dataset")]
pub struct UnknownUserError {
    pub user_id: UserId,
}

impl UnknownUserError {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_message() {
        let err = UnknownUserError::new("Ola");
        assert_eq!(err.to_string(), "Cannot find user 'Ola' in the dataset");
        assert_eq!(err.user_id, "Ola");
    }

    #[test]
    fn test_invalid_value_message() {
        let err = DataLoadError::InvalidValue {
            field: "rating".to_string(),
            value: "NaN".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for rating: NaN");
    }
}
