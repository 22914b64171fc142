//! Error types for spendlens.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`ToolError`] wraps
//! [`ClientError`] so upstream failures reach the tool boundary intact.

use thiserror::Error;

/// Failures raised by the resilient fetch client.
///
/// Every variant reaches the tool boundary unchanged and is rendered into an
/// error payload there. A 404 is carried as [`ClientError::Http`]; lookups that
/// treat absence as a normal outcome check [`ClientError::is_not_found`].
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("USAspending API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Rate limit exceeded after {retries} retries; wait before trying again")]
    RateLimitExceeded { retries: u32 },

    #[error("Request timed out after {timeout_secs}s; try narrowing the date range or filters")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether this is a confirmed-absent entity rather than a failed request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Http { status: 404, .. })
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Upstream(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_status_and_detail() {
        let err = ClientError::Http {
            status: 422,
            message: "Field 'filters' is missing".into(),
        };
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("filters"));
    }

    #[test]
    fn rate_limit_names_retry_count() {
        let err = ClientError::RateLimitExceeded { retries: 2 };
        assert!(err.to_string().contains("2 retries"));
    }

    #[test]
    fn timeout_is_distinct_from_network() {
        let timeout = ClientError::Timeout { timeout_secs: 90 };
        let network = ClientError::Network("connection reset".into());
        assert!(timeout.to_string().contains("timed out"));
        assert!(!network.to_string().contains("timed out"));
    }

    #[test]
    fn not_found_only_for_404() {
        let missing = ClientError::Http {
            status: 404,
            message: "Not found".into(),
        };
        let server = ClientError::Http {
            status: 500,
            message: "boom".into(),
        };
        assert!(missing.is_not_found());
        assert!(!server.is_not_found());
        assert!(!ClientError::Network("x".into()).is_not_found());
    }

    #[test]
    fn upstream_tool_error_is_transparent() {
        let err = ToolError::from(ClientError::RateLimitExceeded { retries: 2 });
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded after 2 retries; wait before trying again"
        );
    }
}
