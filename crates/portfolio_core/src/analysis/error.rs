//! AI path errors and their user-facing classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of one AI client operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// Local request budget for the current window is spent.
    RateLimitExceeded,
    /// DNS failure or refused connection.
    Connection(String),
    Timeout,
    /// Non-success HTTP status from the completion endpoint.
    Status { status: u16, body: String },
    /// Response body could not be decoded or had no content.
    InvalidResponse(String),
    /// Any other transport failure, including client construction.
    Transport(String),
}

/// Coarse classification used for user messages and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiErrorKind {
    ConnectionUnavailable,
    Timeout,
    RateLimitedUpstream,
    AuthenticationFailed,
    UpstreamInternalError,
    UnknownTransient,
}

impl AiErrorKind {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::ConnectionUnavailable => "Could not connect to the AI service",
            Self::Timeout => "The AI service connection timed out",
            Self::RateLimitedUpstream => "AI service rate limit exceeded. Try again in 1 minute",
            Self::AuthenticationFailed => "Authentication with the AI service failed",
            Self::UpstreamInternalError => "The AI service reported an internal error",
            Self::UnknownTransient => "Temporary AI service error",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionUnavailable => "connection_unavailable",
            Self::Timeout => "timeout",
            Self::RateLimitedUpstream => "rate_limited_upstream",
            Self::AuthenticationFailed => "authentication_failed",
            Self::UpstreamInternalError => "upstream_internal_error",
            Self::UnknownTransient => "unknown_transient",
        }
    }
}

impl AiError {
    pub fn kind(&self) -> AiErrorKind {
        match self {
            Self::Connection(_) => AiErrorKind::ConnectionUnavailable,
            Self::Timeout => AiErrorKind::Timeout,
            Self::Status { status: 429, .. } => AiErrorKind::RateLimitedUpstream,
            Self::Status {
                status: 401 | 403, ..
            } => AiErrorKind::AuthenticationFailed,
            Self::Status { status, .. } if (500..=599).contains(status) => {
                AiErrorKind::UpstreamInternalError
            }
            Self::RateLimitExceeded
            | Self::Status { .. }
            | Self::InvalidResponse(_)
            | Self::Transport(_) => AiErrorKind::UnknownTransient,
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Credential failures and the local rate limit are final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::RateLimitExceeded)
            && self.kind() != AiErrorKind::AuthenticationFailed
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

impl Display for AiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimitExceeded => write!(f, "rate limit exceeded; please wait a moment"),
            Self::Connection(message) => write!(f, "AI service connection failed: {message}"),
            Self::Timeout => write!(f, "AI service request timed out"),
            Self::Status { status, .. } => write!(f, "AI service returned HTTP {status}"),
            Self::InvalidResponse(message) => write!(f, "invalid AI service response: {message}"),
            Self::Transport(message) => write!(f, "AI service transport error: {message}"),
        }
    }
}

impl Error for AiError {}

impl From<reqwest::Error> for AiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout
        } else if value.is_connect() {
            Self::Connection(value.to_string())
        } else if value.is_decode() {
            Self::InvalidResponse(value.to_string())
        } else if let Some(status) = value.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AiError, AiErrorKind};

    #[test]
    fn status_codes_map_to_fixed_kinds() {
        let status = |code| AiError::Status {
            status: code,
            body: String::new(),
        };
        assert_eq!(status(429).kind(), AiErrorKind::RateLimitedUpstream);
        assert_eq!(status(401).kind(), AiErrorKind::AuthenticationFailed);
        assert_eq!(status(503).kind(), AiErrorKind::UpstreamInternalError);
        assert_eq!(status(418).kind(), AiErrorKind::UnknownTransient);
        assert_eq!(AiError::Timeout.kind(), AiErrorKind::Timeout);
        assert_eq!(
            AiError::Connection("refused".into()).kind(),
            AiErrorKind::ConnectionUnavailable
        );
    }

    #[test]
    fn authentication_and_local_limit_are_not_retried() {
        let auth = AiError::Status {
            status: 401,
            body: String::new(),
        };
        assert!(!auth.is_retryable());
        assert!(!AiError::RateLimitExceeded.is_retryable());
        assert!(AiError::Timeout.is_retryable());
    }
}
