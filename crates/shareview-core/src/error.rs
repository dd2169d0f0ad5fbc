//! Error types for shareview.

use thiserror::Error;

/// Result type alias using shareview's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for shareview operations.
///
/// Per-item mapping failures are not represented here; see
/// [`crate::mapping::MappingError`]. This type covers failures that abort a
/// whole load.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// The data provider did not answer within the allowed time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Access token missing, expired, or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream throttled the request
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Upstream service returned a server error
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Request(_) | Error::Timeout(_) | Error::RateLimited(_) | Error::Upstream(_)
        )
    }

    /// Message suitable for showing next to a retry action.
    pub fn user_message(&self) -> String {
        match self {
            Error::Request(_) => {
                "Couldn't reach the sharing service. Check your connection and try again."
                    .to_string()
            }
            Error::Timeout(_) => "Loading shared images took too long. Please try again.".to_string(),
            Error::Unauthorized(_) => {
                "Your session has expired. Sign in again to see shared images.".to_string()
            }
            Error::Forbidden(_) => "You don't have permission to list shared items.".to_string(),
            Error::NotFound(_) => "The shared items list could not be found.".to_string(),
            Error::RateLimited(_) => {
                "The sharing service is busy right now. Please try again shortly.".to_string()
            }
            Error::Upstream(_) => {
                "The sharing service had a problem. Please try again.".to_string()
            }
            Error::Serialization(_) => {
                "The sharing service returned data that couldn't be read.".to_string()
            }
            Error::Config(msg) | Error::InvalidInput(msg) | Error::Internal(msg) => {
                format!("Something went wrong: {}", msg)
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else if e.is_decode() {
            Error::Serialization(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = Error::Timeout("no response after 30s".to_string());
        assert_eq!(err.to_string(), "Timed out: no response after 30s");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid token");
    }

    #[test]
    fn test_error_display_rate_limited() {
        let err = Error::RateLimited("retry after 10s".to_string());
        assert_eq!(err.to_string(), "Rate limited: retry after 10s");
    }

    #[test]
    fn test_retryable_variants() {
        assert!(Error::Request("x".into()).is_retryable());
        assert!(Error::Timeout("x".into()).is_retryable());
        assert!(Error::RateLimited("x".into()).is_retryable());
        assert!(Error::Upstream("x".into()).is_retryable());
    }

    #[test]
    fn test_not_retryable_variants() {
        assert!(!Error::Unauthorized("x".into()).is_retryable());
        assert!(!Error::Forbidden("x".into()).is_retryable());
        assert!(!Error::Serialization("x".into()).is_retryable());
        assert!(!Error::Config("x".into()).is_retryable());
    }

    #[test]
    fn test_user_message_never_empty() {
        let errors = [
            Error::Request("a".into()),
            Error::Timeout("b".into()),
            Error::Unauthorized("c".into()),
            Error::Forbidden("d".into()),
            Error::NotFound("e".into()),
            Error::RateLimited("f".into()),
            Error::Upstream("g".into()),
            Error::Serialization("h".into()),
            Error::Config("i".into()),
            Error::InvalidInput("j".into()),
            Error::Internal("k".into()),
        ];
        for err in errors {
            assert!(!err.user_message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn test_user_message_hides_transport_detail() {
        let err = Error::Request("dns error: failed to lookup graph.microsoft.com".into());
        assert!(!err.user_message().contains("dns"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
