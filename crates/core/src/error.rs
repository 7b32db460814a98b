//! Core error types

use thiserror::Error;

/// Errors produced by core type construction and parsing
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
