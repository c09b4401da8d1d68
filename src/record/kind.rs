use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of terminal outcomes for a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Success,
    AlreadyExists,
    NoData,
    NoBase64,
    NotFound,
    ServerError,
    AuthError,
    Forbidden,
    RateLimited,
    Timeout,
    ConnectionError,
    DecodeError,
    UnknownError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 13] = [
        ErrorKind::Success,
        ErrorKind::AlreadyExists,
        ErrorKind::NoData,
        ErrorKind::NoBase64,
        ErrorKind::NotFound,
        ErrorKind::ServerError,
        ErrorKind::AuthError,
        ErrorKind::Forbidden,
        ErrorKind::RateLimited,
        ErrorKind::Timeout,
        ErrorKind::ConnectionError,
        ErrorKind::DecodeError,
        ErrorKind::UnknownError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Success => "SUCCESS",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::NoData => "NO_DATA",
            ErrorKind::NoBase64 => "NO_BASE64",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ServerError => "SERVER_ERROR",
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::ConnectionError => "CONNECTION_ERROR",
            ErrorKind::DecodeError => "DECODE_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Kinds that count as a successful terminal state.
    pub fn is_success(&self) -> bool {
        matches!(self, ErrorKind::Success | ErrorKind::AlreadyExists)
    }

    /// Transient classes: the network stage may be attempted again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::ServerError
                | ErrorKind::Timeout
                | ErrorKind::ConnectionError
                | ErrorKind::RateLimited
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown error kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ErrorKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classes() {
        let transient: Vec<_> = ErrorKind::ALL
            .into_iter()
            .filter(ErrorKind::is_transient)
            .collect();

        assert_eq!(
            transient,
            vec![
                ErrorKind::ServerError,
                ErrorKind::RateLimited,
                ErrorKind::Timeout,
                ErrorKind::ConnectionError,
            ]
        );
    }

    #[test]
    fn test_terminal_classes_are_not_transient() {
        for kind in [
            ErrorKind::NotFound,
            ErrorKind::AuthError,
            ErrorKind::Forbidden,
            ErrorKind::NoData,
            ErrorKind::NoBase64,
            ErrorKind::DecodeError,
            ErrorKind::UnknownError,
        ] {
            assert!(!kind.is_transient(), "{kind} must not be retried");
        }
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&ErrorKind::ConnectionError).unwrap();
        assert_eq!(json, "\"CONNECTION_ERROR\"");

        let parsed: ErrorKind = serde_json::from_str("\"NO_BASE64\"").unwrap();
        assert_eq!(parsed, ErrorKind::NoBase64);
    }

    #[test]
    fn test_from_str_matches_display() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.to_string().parse::<ErrorKind>().unwrap(), kind);
        }
        assert!("HTTP_418".parse::<ErrorKind>().is_err());
    }
}
