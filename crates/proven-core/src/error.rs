//! Error types for the Proven client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to the user when the transport itself failed.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// A shared error type for the entire Proven client.
///
/// Every variant degrades to something the presentation layer can show;
/// none of them is fatal to the process.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ProvenError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced a response (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status or `success: false`
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Client-side validation rejected the input before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation that needs an identity ran without one
    #[error("Not authenticated")]
    Unauthenticated,

    /// A session operation was attempted from a state that does not allow it
    #[error("Invalid session transition: cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProvenError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Api error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a transport failure
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if this is a client-side validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the endpoint rejected the request with the given status
    pub fn is_api_status(&self, expected: u16) -> bool {
        matches!(self, Self::Api { status, .. } if *status == expected)
    }

    /// Returns the text that should be shown to the user.
    ///
    /// Validation and endpoint messages are passed through verbatim, transport
    /// failures collapse to a generic message, and everything else falls back
    /// to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Network(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            _ => fallback.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ProvenError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ProvenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ProvenError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ProvenError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ProvenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Serialization {
                format: "JSON".to_string(),
                message: err.to_string(),
            };
        }
        match err.status() {
            Some(status) => Self::Api {
                status: status.as_u16(),
                message: String::new(),
            },
            None => Self::Network(err.to_string()),
        }
    }
}

/// A type alias for `Result<T, ProvenError>`.
pub type Result<T> = std::result::Result<T, ProvenError>;
