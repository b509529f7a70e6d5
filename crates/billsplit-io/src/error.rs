//! # I/O Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / csv::Error / ValidationError (bad cell)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  IoError (this module) ← Adds row / line context                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CliError (in app) ← Error code + exit status                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billsplit_core::{CoreError, ValidationError};
use thiserror::Error;

/// File adapter errors.
#[derive(Debug, Error)]
pub enum IoError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV layer rejected the data (bad quoting, invalid UTF-8).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required header is absent.
    ///
    /// ## When This Occurs
    /// - No `Item Name` or `Price` column
    /// - Header row missing entirely
    #[error("Missing column '{column}'")]
    MissingColumn { column: String },

    /// A cell could not be turned into a value.
    #[error("Row {row}: {source}")]
    InvalidRow {
        row: u64,
        #[source]
        source: ValidationError,
    },

    /// A receipt line was rejected when applied to a bill.
    #[error("Receipt line {line} ('{name}'): {source}")]
    Ingest {
        line: usize,
        name: String,
        #[source]
        source: CoreError,
    },
}

/// Convenience type alias for Results with IoError.
pub type IoResult<T> = Result<T, IoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_context_in_message() {
        let err = IoError::InvalidRow {
            row: 7,
            source: ValidationError::Required {
                field: "price".to_string(),
            },
        };
        assert_eq!(err.to_string(), "Row 7: price is required");
    }
}
