//! Storage error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing header: expected first column {expected:?}")]
    MissingHeader { expected: &'static str },

    #[error("Invalid month {value:?} on line {line}")]
    InvalidMonth { value: String, line: u64 },

    #[error("Invalid value {value:?} for {tool} on line {line}")]
    InvalidValue { tool: String, value: String, line: u64 },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}
