//! Error handling types and utilities.

use thiserror::Error;

/// A specialized Result type for host-level operations (config and file loading).
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods. Core search operations return [`SearchError`] instead.
pub type Result<T> = anyhow::Result<T>;

/// Errors surfaced by the search core.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was rejected before a session was created.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The raw dataset contained defective records under the strict policy.
    #[error(
        "malformed dataset: record {position} {defect} ({defective} of {total} records defective)"
    )]
    MalformedDataset {
        /// Zero-based position of the first defective record in the input.
        position: usize,
        defect: RecordDefect,
        defective: usize,
        total: usize,
    },

    /// The execution context running a scan became unavailable.
    #[error("search engine fault: {0}")]
    EngineFault(String),

    /// The dataset could not be decoded as a JSON array.
    #[error("failed to decode dataset: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Reasons a query is refused up front.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("query too short: {chars} characters, name searches need at least {min}")]
    QueryTooShort { chars: usize, min: usize },
}

/// Why a single raw record could not be prepared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordDefect {
    #[error("is not a JSON object")]
    NotAnObject,
    #[error("is missing field `{0}`")]
    MissingField(&'static str),
    #[error("has an invalid seating number")]
    InvalidSeatingNumber,
    #[error("has a non-text name")]
    InvalidName,
    #[error("has a non-numeric total score")]
    NonNumericScore,
    #[error("repeats seating number {0}")]
    DuplicateSeatingNumber(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_validation_message_names_minimum() {
        let err = SearchError::from(ValidationError::QueryTooShort { chars: 3, min: 5 });
        check!(err.to_string() == "query too short: 3 characters, name searches need at least 5");
    }

    #[test]
    fn test_malformed_dataset_message() {
        let err = SearchError::MalformedDataset {
            position: 4,
            defect: RecordDefect::MissingField("name"),
            defective: 2,
            total: 10,
        };
        check!(
            err.to_string()
                == "malformed dataset: record 4 is missing field `name` (2 of 10 records defective)"
        );
    }
}
