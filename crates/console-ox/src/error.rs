use console_ox_common::error::CommonRequestError;
use thiserror::Error;

/// Categorizes errors for retry logic and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rate limiting - should retry with backoff
    RateLimit,
    /// Authentication/authorization issues - should not retry
    Auth,
    /// Invalid request format - should not retry
    InvalidRequest,
    /// Network/connection issues - may retry
    Network,
    /// Backend temporarily unavailable - may retry
    ServiceUnavailable,
    /// Unknown/other errors
    Other,
}

#[derive(Debug, Error)]
pub enum ConsoleRequestError {
    /// Transport, JSON, and HTTP-status failures from the shared plumbing
    #[error(transparent)]
    Transport(#[from] CommonRequestError),

    /// Response body was not what the endpoint promises
    #[error("Unexpected response from API: {0}")]
    UnexpectedResponse(String),
}

impl ConsoleRequestError {
    /// Returns the error kind for categorizing errors in retry logic
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(CommonRequestError::Api { status, .. }) => match status {
                401 | 403 => ErrorKind::Auth,
                429 => ErrorKind::RateLimit,
                400 | 404 | 422 => ErrorKind::InvalidRequest,
                500..=599 => ErrorKind::ServiceUnavailable,
                _ => ErrorKind::Other,
            },
            Self::Transport(CommonRequestError::Http(e)) => {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    ErrorKind::Network
                } else {
                    ErrorKind::Other
                }
            }
            Self::Transport(_) | Self::UnexpectedResponse(_) => ErrorKind::Other,
        }
    }

    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimit | ErrorKind::Network | ErrorKind::ServiceUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> ConsoleRequestError {
        ConsoleRequestError::Transport(CommonRequestError::Api {
            status,
            message: "test".to_string(),
        })
    }

    #[test]
    fn classifies_auth_statuses() {
        assert_eq!(api_error(401).kind(), ErrorKind::Auth);
        assert_eq!(api_error(403).kind(), ErrorKind::Auth);
        assert!(!api_error(401).is_retryable());
    }

    #[test]
    fn classifies_retryable_statuses() {
        assert_eq!(api_error(429).kind(), ErrorKind::RateLimit);
        assert_eq!(api_error(503).kind(), ErrorKind::ServiceUnavailable);
        assert!(api_error(429).is_retryable());
        assert!(api_error(503).is_retryable());
    }

    #[test]
    fn classifies_invalid_requests() {
        assert_eq!(api_error(422).kind(), ErrorKind::InvalidRequest);
        assert!(!api_error(422).is_retryable());
    }
}
