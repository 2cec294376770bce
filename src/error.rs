//! Error types for Wayfarer
//!
//! Provides a unified error type for all operations. Request-level variants
//! map onto a response status in [`crate::protocol::Response::from_error`].

use thiserror::Error;

/// Result type alias using WayfarerError
pub type Result<T> = std::result::Result<T, WayfarerError>;

/// Unified error type for Wayfarer operations
#[derive(Debug, Error)]
pub enum WayfarerError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Startup Errors
    // -------------------------------------------------------------------------
    #[error("Load error: {0}")]
    Load(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for WayfarerError {
    fn from(e: serde_json::Error) -> Self {
        WayfarerError::Serialization(e.to_string())
    }
}

impl WayfarerError {
    /// Shorthand for a validation failure
    pub fn invalid(message: impl Into<String>) -> Self {
        WayfarerError::Validation(message.into())
    }

    /// Shorthand for a malformed request
    pub fn malformed(message: impl Into<String>) -> Self {
        WayfarerError::MalformedRequest(message.into())
    }
}
