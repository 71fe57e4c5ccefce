//! Error types for repoclient
//!
//! This module defines the error hierarchy for the entire client.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type for repoclient
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Protocol violation: {message}")]
    Protocol { message: String },

    // ============================================================================
    // Server Errors
    // ============================================================================
    #[error("[{status}] [{}] {error}", .request_id.as_deref().unwrap_or("-"))]
    Repository {
        status: u16,
        request_id: Option<String>,
        error: RepositoryError,
    },

    #[error("HTTP {status} with unparseable error body (request id: {}): {body}", .request_id.as_deref().unwrap_or("-"))]
    ErrorResponse {
        status: u16,
        request_id: Option<String>,
        body: String,
    },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to deserialize page {page}: {message}")]
    Deserialization { page: u64, message: String },

    #[error("Page {page} failed, remaining fetches cancelled: {source}")]
    PageWorker {
        page: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("Fetch task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Decode pool has been shut down")]
    PoolClosed,

    #[error("Retrieval was cancelled")]
    Cancelled,

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid pagination options: {message}")]
    InvalidOptions { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create an invalid options error
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a deserialization error for a page
    pub fn deserialization(page: u64, message: impl Into<String>) -> Self {
        Self::Deserialization {
            page,
            message: message.into(),
        }
    }

    /// Check if a fresh attempt at the same request could succeed.
    ///
    /// Transport and protocol failures are always transient; server responses
    /// are transient only for 5xx and 429. Deserialization failures never are.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Protocol { .. } => true,
            Error::Repository { status, .. } | Error::ErrorResponse { status, .. } => {
                is_transient_status(*status)
            }
            _ => false,
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Repository { status, .. } | Error::ErrorResponse { status, .. } => {
                Some(*status)
            }
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            Error::PageWorker { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Server request id, for errors that came back from the repository
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Repository { request_id, .. } | Error::ErrorResponse { request_id, .. } => {
                request_id.as_deref()
            }
            Error::PageWorker { source, .. } => source.request_id(),
            _ => None,
        }
    }

    /// Structured server error, if the repository sent one
    pub fn repository_error(&self) -> Option<&RepositoryError> {
        match self {
            Error::Repository { error, .. } => Some(error),
            Error::PageWorker { source, .. } => source.repository_error(),
            _ => None,
        }
    }
}

/// Check if an HTTP status code is transient
pub(crate) fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Result type alias for repoclient
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Server error payload
// ============================================================================

/// Error body returned by the repository on any non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryError {
    /// Status code as reported in the body
    #[serde(default)]
    pub status_code: u16,
    /// Error kind
    pub kind: RepositoryErrorKind,
    /// Human-readable detail
    #[serde(default)]
    pub detail: Option<String>,
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.kind, detail),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Error kinds the repository is known to emit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RepositoryErrorKind {
    DuplicateError,
    BadRequest,
    ValidationFailure,
    ServerError,
    NotFound,
    InactiveUser,
    InvalidCredentials,
    InvalidToken,
    MissingAuthHeader,
    AdminOnlyResource,
    InsufficientPermissions,
    InvalidOperation,
    ConflictingOperation,
    CastError,
    InvalidQuery,
    InvalidPageSize,
    /// A kind this client does not know about
    Other(String),
}

impl RepositoryErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::DuplicateError => "DuplicateError",
            Self::BadRequest => "BadRequest",
            Self::ValidationFailure => "ValidationFailure",
            Self::ServerError => "ServerError",
            Self::NotFound => "NotFound",
            Self::InactiveUser => "InactiveUser",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::InvalidToken => "InvalidToken",
            Self::MissingAuthHeader => "MissingAuthHeader",
            Self::AdminOnlyResource => "AdminOnlyResource",
            Self::InsufficientPermissions => "InsufficientPermissions",
            Self::InvalidOperation => "InvalidOperation",
            Self::ConflictingOperation => "ConflictingOperation",
            Self::CastError => "CastError",
            Self::InvalidQuery => "InvalidQuery",
            Self::InvalidPageSize => "InvalidPageSize",
            Self::Other(kind) => kind,
        }
    }

    /// Whether this is a kind the client recognizes
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for RepositoryErrorKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "DuplicateError" => Self::DuplicateError,
            "BadRequest" => Self::BadRequest,
            "ValidationFailure" => Self::ValidationFailure,
            "ServerError" => Self::ServerError,
            "NotFound" => Self::NotFound,
            "InactiveUser" => Self::InactiveUser,
            "InvalidCredentials" => Self::InvalidCredentials,
            "InvalidToken" => Self::InvalidToken,
            "MissingAuthHeader" => Self::MissingAuthHeader,
            "AdminOnlyResource" => Self::AdminOnlyResource,
            "InsufficientPermissions" => Self::InsufficientPermissions,
            "InvalidOperation" => Self::InvalidOperation,
            "ConflictingOperation" => Self::ConflictingOperation,
            "CastError" => Self::CastError,
            "InvalidQuery" => Self::InvalidQuery,
            "InvalidPageSize" => Self::InvalidPageSize,
            _ => Self::Other(value),
        }
    }
}

impl From<RepositoryErrorKind> for String {
    fn from(kind: RepositoryErrorKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn repository(status: u16) -> Error {
        Error::Repository {
            status,
            request_id: Some("req-1".to_string()),
            error: RepositoryError {
                status_code: status,
                kind: RepositoryErrorKind::ServerError,
                detail: None,
            },
        }
    }

    #[test]
    fn test_error_display() {
        let err = Error::protocol("missing header");
        assert_eq!(err.to_string(), "Protocol violation: missing header");

        let err = Error::Repository {
            status: 404,
            request_id: Some("abc".to_string()),
            error: RepositoryError {
                status_code: 404,
                kind: RepositoryErrorKind::NotFound,
                detail: Some("Couldn't find format 7.".to_string()),
            },
        };
        assert_eq!(err.to_string(), "[404] [abc] NotFound: Couldn't find format 7.");
    }

    #[test]
    fn test_is_transient() {
        assert!(Error::protocol("x").is_transient());
        assert!(repository(500).is_transient());
        assert!(repository(503).is_transient());
        assert!(repository(429).is_transient());
        assert!(Error::ErrorResponse {
            status: 502,
            request_id: None,
            body: "<html>".to_string()
        }
        .is_transient());

        assert!(!repository(400).is_transient());
        assert!(!repository(403).is_transient());
        assert!(!repository(404).is_transient());
        assert!(!Error::deserialization(0, "bad").is_transient());
        assert!(!Error::invalid_options("bad").is_transient());
    }

    #[test]
    fn test_context_through_worker_error() {
        let err = Error::PageWorker {
            page: 3,
            source: Box::new(repository(500)),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.request_id(), Some("req-1"));
        assert!(err.repository_error().is_some());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_repository_error_parse() {
        let body = r#"{"statusCode": 403, "kind": "AdminOnlyResource", "detail": "admins only"}"#;
        let parsed: RepositoryError = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status_code, 403);
        assert_eq!(parsed.kind, RepositoryErrorKind::AdminOnlyResource);
        assert_eq!(parsed.detail.as_deref(), Some("admins only"));
    }

    #[test]
    fn test_repository_error_unknown_kind() {
        let body = r#"{"statusCode": 418, "kind": "Teapot"}"#;
        let parsed: RepositoryError = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.kind, RepositoryErrorKind::Other("Teapot".to_string()));
        assert!(!parsed.kind.is_known());
        assert!(parsed.detail.is_none());
        assert_eq!(
            serde_json::to_value(&parsed.kind).unwrap(),
            serde_json::json!("Teapot")
        );
    }
}
