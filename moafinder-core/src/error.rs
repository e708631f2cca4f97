//! Error types for moafinder.

use thiserror::Error;

/// Errors that can occur in moafinder operations.
#[derive(Error, Debug)]
pub enum MoaError {
    /// The recurrence fields of an event do not describe a usable schedule.
    /// Malformed input; retrying will not help.
    #[error("Invalid recurrence descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MoaError {
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        MoaError::InvalidDescriptor(message.into())
    }

    pub fn is_invalid_descriptor(&self) -> bool {
        matches!(self, MoaError::InvalidDescriptor(_))
    }
}

/// Result type alias for moafinder operations.
pub type MoaResult<T> = Result<T, MoaError>;
