use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PssmError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid matrix row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("Unknown de novo method: {0}")]
    UnknownMethod(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Result with PssmError
pub type Result<T> = std::result::Result<T, PssmError>;

impl PssmError {
    /// Create a new MalformedInput error
    pub fn malformed(message: impl Into<String>) -> Self {
        PssmError::MalformedInput(message.into())
    }

    /// Create a new InvalidRow error, `row` is 1-based
    pub fn invalid_row(row: usize, message: impl Into<String>) -> Self {
        PssmError::InvalidRow {
            row,
            message: message.into(),
        }
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        PssmError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}
