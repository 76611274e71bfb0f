//! Centralized error types for the weatherbot service.
//!
//! Errors that reach the HTTP layer are wrapped in [`AppError`], which
//! carries a short user-facing message alongside the full error chain
//! used for logging.

use thiserror::Error;

/// Top-level service error type.
///
/// Use `user_message()` to get a message that is safe to return to clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Intent classifier error: {0}")]
    Classifier(#[from] ClassifierError),
}

impl AppError {
    /// Returns a client-facing message that does not leak internal details.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Classifier(e) => e.user_message(),
        }
    }

    /// Stable machine-readable code for error responses
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Classifier(_) => "classifier_failed",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Unable to reach an upstream service.",
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "An upstream service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Zero-shot intent classifier errors.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Model is still loading on the inference backend (HTTP 503)
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid classifier response: {0}")]
    InvalidResponse(String),

    #[error("Unknown intent label: {0}")]
    UnknownLabel(String),
}

impl ClassifierError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ClassifierError::Network(e) => e.user_message(),
            ClassifierError::Api { status, .. } if *status == 401 || *status == 403 => {
                "The intent classifier rejected our credentials."
            }
            ClassifierError::Api { .. } => "The intent classifier request failed.",
            ClassifierError::ModelUnavailable(_) => {
                "The intent classifier is warming up. Please try again shortly."
            }
            ClassifierError::InvalidResponse(_) | ClassifierError::UnknownLabel(_) => {
                "The intent classifier returned an unexpected response."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
