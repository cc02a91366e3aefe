//! Error types for the cuadre analysis core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole analysis core.
///
/// Only the `Provider` variant represents a failure that crosses the core
/// boundary as-is (the transport layer maps it to service-unavailable).
/// Everything else is either recovered locally or reported as a structured
/// result instead of an error.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CuadreError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// Configuration error (missing or invalid environment settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// AI provider transport error (network, HTTP status, empty reply)
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        status_code: Option<u16>,
        is_retryable: bool,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", etc.
        message: String,
    },

    /// Structural input error (malformed document/sheet data)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CuadreError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a non-retryable Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            status_code: None,
            is_retryable: false,
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a provider transport error
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Check if a retry of the failed provider call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider {
                is_retryable: true,
                ..
            }
        )
    }
}

impl From<std::io::Error> for CuadreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CuadreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for CuadreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Provider {
            message: err.to_string(),
            status_code: err.status().map(|s| s.as_u16()),
            is_retryable: err.is_connect() || err.is_timeout(),
        }
    }
}

/// Conversion from anyhow::Error (transitional, should be removed eventually)
impl From<anyhow::Error> for CuadreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, CuadreError>`.
pub type Result<T> = std::result::Result<T, CuadreError>;
