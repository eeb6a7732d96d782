//! SDK error types.

use std::time::Duration;

use thiserror::Error;

use crate::http::ErrorCode;

/// Errors raised by the SDK.
///
/// Every non-2xx response that reaches the caller, whether it failed
/// permanently or exhausted its retry budget, surfaces as [`Error::Api`].
/// Callers branch on the carried status code rather than on the variant.
#[derive(Debug, Error)]
pub enum Error {
    /// The service answered with a non-2xx status.
    #[error("{code} (HTTP {status}) after {attempts} attempt(s): {body}")]
    Api {
        /// HTTP status code of the last attempt.
        status: u16,
        /// Human-readable classification of the status.
        code: ErrorCode,
        /// Raw response body of the last attempt.
        body: String,
        /// Total number of attempts made for this call.
        attempts: u32,
    },

    /// The transport failed before any status was received.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request could not be built. Raised before any network call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A lookup by name or id found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bounded wait expired before its condition held.
    #[error("Timed out after {waited:?} waiting for {what}")]
    Timeout {
        /// What was being waited for.
        what: String,
        /// Wall-clock time spent waiting.
        waited: Duration,
    },

    /// A server-side export job ended in a failure state.
    #[error("Export {export_uuid} failed with status {status}")]
    ExportFailed {
        /// Export job identifier.
        export_uuid: String,
        /// Terminal status reported by the service.
        status: String,
    },
}

impl Error {
    /// HTTP status carried by an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Classified error code carried by an API error.
    pub fn error_code(&self) -> Option<&ErrorCode> {
        match self {
            Error::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the carried status would have been retried by the executor.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Api { code, .. } if code.is_retryable())
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. } | Error::NotFound(_))
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api { status: 401 | 403, .. })
    }
}

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;
