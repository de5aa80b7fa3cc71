//! Domain error types
//!
//! This module defines the error hierarchy for Bastion. All errors are
//! domain-specific and don't expose third-party types.

use serde::Serialize;
use thiserror::Error;

/// Main Bastion error type
///
/// This is the primary error type used throughout the engine. Soft outcomes
/// (a document that does not exist) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum BastionError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document store errors (single document read/write, transport)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Failure to list a collection's documents or the store's collections
    #[error("Enumeration error: {0}")]
    Enumeration(String),

    /// A value in a snapshot has no textual encoding
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Unknown schema template requested by the caller
    #[error("Unknown schema template: {0}")]
    UnknownTemplate(String),

    /// Malformed document path or identifier supplied by the caller
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    /// Credential or token exchange errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Artifact sink errors
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl BastionError {
    /// Stable snake_case name of the error kind, used in response envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            BastionError::Configuration(_) => "configuration",
            BastionError::Store(StoreError::ConnectionFailed(_) | StoreError::Timeout(_)) => {
                "connection"
            }
            BastionError::Store(_) => "store",
            BastionError::Enumeration(_) => "enumeration",
            BastionError::Encoding(_) => "encoding",
            BastionError::UnknownTemplate(_) => "unknown_template",
            BastionError::InvalidPath(_) => "invalid_path",
            BastionError::Authentication(_) => "authentication",
            BastionError::Artifact(_) => "artifact",
            BastionError::Serialization(_) => "serialization",
            BastionError::Io(_) => "io",
        }
    }

    /// Whether the error was caused by the caller's input rather than the store
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            BastionError::UnknownTemplate(_) | BastionError::InvalidPath(_)
        )
    }
}

/// Document store errors
///
/// Errors that occur when talking to the document store. These errors
/// don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to document store: {0}")]
    ConnectionFailed(String),

    /// Failed to read a document
    #[error("Failed to read document {path}: {message}")]
    ReadFailed { path: String, message: String },

    /// Failed to write a document
    #[error("Failed to write document {path}: {message}")]
    WriteFailed { path: String, message: String },

    /// Failed to list documents or collections
    #[error("Failed to list {target}: {message}")]
    ListFailed { target: String, message: String },

    /// Invalid response body
    #[error("Invalid response from store: {0}")]
    InvalidResponse(String),

    /// Throttling error (429)
    #[error("Request rate too large (429): {0}")]
    Throttled(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Per-document failure detail collected during a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    /// Identifier of the document that failed
    pub document_id: String,

    /// Error message
    pub message: String,
}

impl DocumentFailure {
    /// Creates a new document failure
    pub fn new(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            message: message.into(),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BastionError {
    fn from(err: std::io::Error) -> Self {
        BastionError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BastionError {
    fn from(err: serde_json::Error) -> Self {
        BastionError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BastionError {
    fn from(err: toml::de::Error) -> Self {
        BastionError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from transport errors
impl From<reqwest::Error> for BastionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BastionError::Store(StoreError::Timeout(err.to_string()))
        } else {
            BastionError::Store(StoreError::ConnectionFailed(err.to_string()))
        }
    }
}

// Conversion from assertion signing errors
impl From<jsonwebtoken::errors::Error> for BastionError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        BastionError::Authentication(format!("Failed to sign service account assertion: {err}"))
    }
}
