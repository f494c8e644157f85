//! Error types for UCI RPC operations.
//!
//! Errors are categorized so the client can decide whether a failed call
//! is worth retrying and so callers can tell a missing section apart from
//! a broken transport.

use std::fmt;
use thiserror::Error;

/// Result type for UCI RPC operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of RPC errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, timeout or server-side failure (transient, retryable)
    Network,
    /// Login rejected or session expired
    Auth,
    /// Section does not exist
    NotFound,
    /// The service answered, but not in a way we understand or accept
    Protocol,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Section not found",
            Self::Protocol => "Unexpected RPC response",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the UCI service.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connection refused, DNS, timeout, ...)
    #[error("network error: {message}")]
    Network {
        /// Detailed error message from the failed request
        message: String,
    },

    /// The server answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Login failed or the session token was rejected
    #[error("authentication failed: {message}")]
    Auth {
        /// Details from the server, if any
        message: String,
    },

    /// The JSON-RPC envelope carried an `error` member
    #[error("RPC error: {message}")]
    Rpc {
        /// Error reported by the service
        message: String,
    },

    /// The addressed section does not exist
    #[error("section not found: {config}.{section}")]
    NotFound {
        /// Config namespace (e.g. `firewall`)
        config: String,
        /// Section selector (e.g. `lan` or `@zone[1]`)
        section: String,
    },

    /// The service answered with something we could not interpret
    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not-found error for a section selector.
    pub fn not_found(config: impl Into<String>, section: impl Into<String>) -> Self {
        Self::NotFound {
            config: config.into(),
            section: section.into(),
        }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network { .. } => ErrorCategory::Network,
            Error::Http { status, .. } if *status >= 500 => ErrorCategory::Network,
            Error::Http { status: 401 | 403, .. } => ErrorCategory::Auth,
            Error::Auth { .. } => ErrorCategory::Auth,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Http { .. } | Error::Rpc { .. } => ErrorCategory::Protocol,
            Error::InvalidResponse(_) | Error::Json(_) => ErrorCategory::Protocol,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Whether the addressed section is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                status: code,
                message: format!("HTTP {code}"),
            },
            ureq::Error::Json(e) => Self::Json(e),
            other => Self::Network {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::Protocol.is_retryable());
    }

    #[test]
    fn test_http_status_categories() {
        let server = Error::Http {
            status: 502,
            message: "bad gateway".into(),
        };
        let forbidden = Error::Http {
            status: 403,
            message: "forbidden".into(),
        };
        let teapot = Error::Http {
            status: 418,
            message: "teapot".into(),
        };

        assert_eq!(server.category(), ErrorCategory::Network);
        assert!(server.is_retryable());
        assert_eq!(forbidden.category(), ErrorCategory::Auth);
        assert_eq!(teapot.category(), ErrorCategory::Protocol);
    }

    #[test]
    fn test_not_found() {
        let err = Error::not_found("firewall", "@zone[3]");
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "section not found: firewall.@zone[3]");
    }

    #[test]
    fn test_rpc_error_is_protocol() {
        let err = Error::Rpc {
            message: "Method not found".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Protocol);
        assert_eq!(err.to_string(), "RPC error: Method not found");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Auth.to_string(), "Authentication failed");
        assert_eq!(ErrorCategory::Protocol.to_string(), "Unexpected RPC response");
    }
}
