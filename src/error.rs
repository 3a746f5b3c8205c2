//! Error types for the GenStudio client.

use thiserror::Error;

/// Errors raised by the studio client, the generation orchestrator and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected before any request was issued (missing API key, empty prompt, ...).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request never produced a response (connect failure, timeout, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status or `success: false`.
    #[error("{message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// The server answered 2xx but the body was not the expected JSON.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn service(status: Option<u16>, message: impl Into<String>) -> Self {
        ApiError::Service {
            status,
            message: message.into(),
        }
    }

    /// Message recorded against a failed batch unit.
    ///
    /// Service errors already carry the most specific text available (server
    /// `detail`, then HTTP status text), so they are reported bare.
    pub fn unit_message(&self) -> String {
        match self {
            ApiError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status attached to the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Service { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
