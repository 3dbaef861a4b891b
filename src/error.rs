// src/error.rs
//! Error vocabulary for the content layer and the binary around it.
//!
//! [`ContentError`] is what every fetch path returns. It is `Clone` so that
//! one settled upstream call can hand the same outcome to every caller that
//! was de-duplicated onto it. [`AppError`] wraps it together with the
//! failures that only the process itself can hit (configuration, IO,
//! logging setup).

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded; back off and retry
    RateLimited,
    /// The requested object does not exist or is inaccessible
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// The response body could not be decoded
    MalformedResponse,
    /// The request never produced a response (DNS, TLS, connection reset)
    Transport,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            404 => Self::ObjectNotFound,
            401 => Self::Unauthorized,
            503 => Self::ServiceUnavailable,
            other => Self::HttpStatus(other),
        }
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::ServiceUnavailable
                | Self::InternalError
                | Self::Transport
                | Self::HttpStatus(500..=599)
        )
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::MalformedResponse => write!(f, "malformed_response"),
            Self::Transport => write!(f, "transport"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Why a content fetch failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// The operation did not finish within its budget.
    #[error("{label} timed out after {}ms", .timeout.as_millis())]
    Timeout { label: String, timeout: Duration },

    /// The Notion API failed or answered with an error payload.
    #[error("Notion API returned an error ({code}): {message}")]
    Upstream {
        code: NotionErrorCode,
        message: String,
    },

    /// The circuit breaker short-circuited the call.
    #[error("Circuit breaker is open")]
    CircuitOpen,

    /// The fetch succeeded but produced no usable body and was not partial.
    #[error("Content is empty or invalid")]
    EmptyContent,

    /// The client could not reach the local content API.
    #[error("Network failure: {0}")]
    Network(String),
}

impl ContentError {
    pub fn upstream(code: NotionErrorCode, message: impl Into<String>) -> Self {
        Self::Upstream {
            code,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether trying again later could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::CircuitOpen | Self::Network(_) => true,
            Self::Upstream { code, .. } => code.is_retryable(),
            Self::EmptyContent => true,
        }
    }
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        let code = match err.status() {
            Some(status) => NotionErrorCode::from_http_status(status.as_u16()),
            None if err.is_decode() => NotionErrorCode::MalformedResponse,
            None => NotionErrorCode::Transport,
        };
        Self::upstream(code, err.to_string())
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        Self::upstream(NotionErrorCode::MalformedResponse, err.to_string())
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_carries_label_and_budget() {
        let err = ContentError::Timeout {
            label: "Database query".to_string(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "Database query timed out after 10000ms");
        assert!(err.is_timeout());
    }

    #[test]
    fn error_codes_classify_api_payloads() {
        assert_eq!(
            NotionErrorCode::from_api_response("rate_limited"),
            NotionErrorCode::RateLimited
        );
        assert_eq!(
            NotionErrorCode::from_api_response("object_not_found"),
            NotionErrorCode::ObjectNotFound
        );
        assert_eq!(
            NotionErrorCode::from_api_response("brand_new_code"),
            NotionErrorCode::Unknown("brand_new_code".to_string())
        );
    }

    #[test]
    fn transient_codes_are_retryable() {
        assert!(NotionErrorCode::RateLimited.is_retryable());
        assert!(NotionErrorCode::HttpStatus(502).is_retryable());
        assert!(!NotionErrorCode::Unauthorized.is_retryable());
        assert!(!NotionErrorCode::HttpStatus(400).is_retryable());
    }

    #[test]
    fn content_errors_classify_retryability() {
        assert!(ContentError::CircuitOpen.is_retryable());
        assert!(ContentError::Network("offline".to_string()).is_retryable());
        assert!(ContentError::upstream(NotionErrorCode::RateLimited, "slow down").is_retryable());
        assert!(!ContentError::upstream(NotionErrorCode::Unauthorized, "bad token").is_retryable());
        assert!(!ContentError::upstream(NotionErrorCode::ObjectNotFound, "gone").is_retryable());
    }

    #[test]
    fn upstream_display_includes_code() {
        let err = ContentError::upstream(NotionErrorCode::ObjectNotFound, "no such page");
        assert_eq!(
            err.to_string(),
            "Notion API returned an error (object_not_found): no such page"
        );
    }
}
