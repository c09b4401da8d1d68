use thiserror::Error;

use crate::record::ErrorKind;

/// Classified failure of one HTTP fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("File not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Rate limited")]
    RateLimited,

    #[error("Server error (HTTP {0})")]
    ServerError(u16),

    #[error("HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unexpected error: {0}")]
    Other(String),
}

impl FetchError {
    /// Map a non-2xx status code to its failure class
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => FetchError::Unauthorized,
            403 => FetchError::Forbidden,
            404 => FetchError::NotFound,
            429 => FetchError::RateLimited,
            500..=599 => FetchError::ServerError(code),
            _ => FetchError::UnexpectedStatus(code),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::NotFound => ErrorKind::NotFound,
            FetchError::Unauthorized => ErrorKind::AuthError,
            FetchError::Forbidden => ErrorKind::Forbidden,
            FetchError::RateLimited => ErrorKind::RateLimited,
            FetchError::ServerError(_) => ErrorKind::ServerError,
            FetchError::UnexpectedStatus(_) => ErrorKind::UnknownError,
            FetchError::Timeout => ErrorKind::Timeout,
            FetchError::Connection(_) => ErrorKind::ConnectionError,
            FetchError::Other(_) => ErrorKind::UnknownError,
        }
    }

    /// Transient failures (timeouts, connection resets, 5xx, 429) return `true`
    pub fn is_retryable(&self) -> bool {
        self.kind().is_transient()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() || e.is_request() || e.is_body() {
            FetchError::Connection(error_chain(&e))
        } else {
            FetchError::Other(error_chain(&e))
        }
    }
}

/// Flatten an error and its sources into one line
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(FetchError::from_status(404).kind(), ErrorKind::NotFound);
        assert_eq!(FetchError::from_status(401).kind(), ErrorKind::AuthError);
        assert_eq!(FetchError::from_status(403).kind(), ErrorKind::Forbidden);
        assert_eq!(FetchError::from_status(429).kind(), ErrorKind::RateLimited);
        assert_eq!(FetchError::from_status(500).kind(), ErrorKind::ServerError);
        assert_eq!(FetchError::from_status(503).kind(), ErrorKind::ServerError);
        assert_eq!(FetchError::from_status(418).kind(), ErrorKind::UnknownError);
        assert_eq!(FetchError::from_status(302).kind(), ErrorKind::UnknownError);
    }

    #[test]
    fn test_retryable_classes() {
        assert!(FetchError::ServerError(502).is_retryable());
        assert!(FetchError::RateLimited.is_retryable());
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::Connection("reset".into()).is_retryable());

        assert!(!FetchError::NotFound.is_retryable());
        assert!(!FetchError::Unauthorized.is_retryable());
        assert!(!FetchError::Forbidden.is_retryable());
        assert!(!FetchError::UnexpectedStatus(400).is_retryable());
        assert!(!FetchError::Other("boom".into()).is_retryable());
    }

    #[test]
    fn test_messages() {
        assert_eq!(FetchError::NotFound.to_string(), "File not found");
        assert_eq!(FetchError::UnexpectedStatus(418).to_string(), "HTTP 418");
        assert_eq!(
            FetchError::ServerError(503).to_string(),
            "Server error (HTTP 503)"
        );
    }
}
