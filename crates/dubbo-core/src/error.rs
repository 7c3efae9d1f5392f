//! Error types for the Dubbo client.
//!
//! Registry failures are split by how the resolver treats them: `Forbidden`
//! always reaches the caller, `Conflict` only ends pagination, and the
//! remaining transport errors surface only when snapshot fallback is disabled.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the Dubbo client.
#[derive(Debug, Error)]
pub enum DubboError {
    // Registry errors
    #[error("Insufficient privilege for namespace {namespace:?}")]
    Forbidden { namespace: String },

    #[error("Service list is being modified concurrently for namespace {namespace:?}")]
    Conflict { namespace: String },

    #[error("Registry returned status {status}: {message}")]
    Registry { status: u16, message: String },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    // Telnet errors
    #[error("Prompt {marker:?} not received within {elapsed:?}")]
    ProtocolTimeout { marker: String, elapsed: Duration },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Validation errors
    #[error("Invalid server address {input:?}: {message}")]
    InvalidAddress { input: String, message: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },
}

/// Result type alias for Dubbo client operations.
pub type Result<T> = std::result::Result<T, DubboError>;

impl DubboError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        DubboError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Whether a caller-side retry has a chance of succeeding.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DubboError::Conflict { .. }
                | DubboError::Network { .. }
                | DubboError::Timeout(_)
                | DubboError::ProtocolTimeout { .. }
        )
    }
}
