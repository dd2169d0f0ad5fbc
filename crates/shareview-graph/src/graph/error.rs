//! Graph-specific error handling.

use shareview_core::Error;

/// Graph error classes, derived from HTTP status and the error body's `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphErrorCode {
    /// Token missing, expired, or malformed.
    InvalidAuthenticationToken,
    /// Authenticated but lacking permission (e.g. Files.Read.All not consented).
    AccessDenied,
    /// Drive or item not found.
    ItemNotFound,
    /// Request throttled.
    Throttled,
    /// Graph service error.
    ServiceUnavailable,
    /// Anything else.
    Unknown,
}

impl GraphErrorCode {
    /// Determine error code from HTTP status and Graph error code.
    pub fn from_response(status: u16, code: &str) -> Self {
        match (status, code) {
            (401, _) | (_, "InvalidAuthenticationToken") => Self::InvalidAuthenticationToken,
            (403, _) | (_, "accessDenied") => Self::AccessDenied,
            (404, _) | (_, "itemNotFound") => Self::ItemNotFound,
            (429, _) | (_, "activityLimitReached") => Self::Throttled,
            (500..=599, _) => Self::ServiceUnavailable,
            _ => Self::Unknown,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled | Self::ServiceUnavailable)
    }
}

/// Convert a Graph error to a shareview Error.
pub fn to_shareview_error(code: GraphErrorCode, message: &str) -> Error {
    match code {
        GraphErrorCode::InvalidAuthenticationToken => Error::Unauthorized(message.to_string()),
        GraphErrorCode::AccessDenied => Error::Forbidden(message.to_string()),
        GraphErrorCode::ItemNotFound => Error::NotFound(message.to_string()),
        GraphErrorCode::Throttled => Error::RateLimited(message.to_string()),
        GraphErrorCode::ServiceUnavailable => Error::Upstream(message.to_string()),
        GraphErrorCode::Unknown => Error::Request(message.to_string()),
    }
}
