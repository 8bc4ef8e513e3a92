//! Error model for platform calls
//!
//! Remote calls fail in one of four ways, and the distinction drives both
//! the status text shown in the editor and the retry behavior of callers:
//!
//! - [`PlatformError::Api`]: the platform answered with a structured error
//! - [`PlatformError::Transport`]: the platform could not be reached
//! - [`PlatformError::InvalidRequest`]: the request was rejected before or
//!   at the protocol boundary (local validation failure)
//! - [`PlatformError::Protocol`]: the platform answered with something we
//!   could not make sense of

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using PlatformError
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Well-known structured error codes returned by the platform
pub mod codes {
    /// The supplied credential was rejected
    pub const BAD_CREDENTIALS: &str = "bad_credentials";
    /// No dataset matches the identifier
    pub const DATASET_NOT_FOUND: &str = "dataset_not_found";
    /// No model matches the identifier
    pub const MODEL_NOT_FOUND: &str = "model_not_found";
    /// A request parameter failed server-side validation
    pub const INVALID_PARAMETER: &str = "invalid_parameter";
    /// Too many requests in a short window; safe to retry later
    pub const QUOTA_EXCEEDED: &str = "quota_exceeded";
}

/// A structured error returned by the platform API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code (see [`codes`])
    pub code: String,
    /// Optional human-readable detail, set for `invalid_parameter`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiError {
    /// Create an error with a code and no detail
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reason: None,
        }
    }

    /// Whether the credential was rejected
    pub fn is_bad_credentials(&self) -> bool {
        self.code == codes::BAD_CREDENTIALS
    }

    /// Whether the error reports a missing resource (dataset or model)
    pub fn is_not_found(&self) -> bool {
        self.code == codes::DATASET_NOT_FOUND || self.code == codes::MODEL_NOT_FOUND
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            Some(reason) if self.code == codes::INVALID_PARAMETER => {
                write!(f, "{} - {}", self.code, reason)
            }
            _ => write!(f, "{}", self.code),
        }
    }
}

/// Errors that can occur when calling the platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The platform answered with a structured error
    #[error("the platform returned an error: {0}")]
    Api(ApiError),

    /// The platform could not be reached
    #[error("failed to communicate with the platform: {0}")]
    Transport(String),

    /// The request was rejected at the protocol boundary
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The platform's answer did not match the protocol
    #[error("malformed platform response: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            Self::Protocol(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
