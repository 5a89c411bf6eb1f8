//! Validation errors raised while turning an uploaded table into order records.

use thiserror::Error;

/// Errors that stop the pipeline before any output is produced.
///
/// Each variant names the offending column so the message can be shown to the
/// user as-is.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required column is absent from the dataset.
    #[error("required column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A DateOfOrder value could not be read as a date or timestamp.
    #[error("column '{column}' row {row}: '{value}' is not a valid date")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },

    /// A ValueOfOrder value is not a finite, non-negative number.
    #[error("column '{column}' row {row}: '{value}' is not a valid order value")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    /// A required field is empty.
    #[error("column '{column}' row {row}: value is missing")]
    NullValue { column: String, row: usize },

    /// The column exists but its type cannot hold the expected values.
    #[error("column '{column}' has unsupported type {dtype}")]
    UnsupportedType { column: String, dtype: String },

    /// The dataset contains no order rows.
    #[error("dataset contains no order rows")]
    EmptyDataset,

    /// Failed DataFrame operation while reading a column.
    #[error("failed to read column '{column}': {message}")]
    DataFrame { column: String, message: String },
}
