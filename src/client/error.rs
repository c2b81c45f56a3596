use std::error::Error as StdError;

use crate::domain::{ApiKey, ValidationError};
use crate::transport::{ApiErrorBody, TransportError};

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`DripClient`](crate::DripClient).
///
/// Every variant exposes an HTTP status via [`DripError::status`] (0 for local and
/// transport failures) and a machine code via [`DripError::code`].
pub enum DripError {
    /// No API key was configured and the environment does not provide one.
    #[error("Drip API key is required; configure one explicitly or set {}", ApiKey::ENV)]
    MissingCredential,

    /// The server rejected the API key (HTTP 401).
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        code: Option<String>,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {message}")]
    NotFound {
        message: String,
        code: Option<String>,
    },

    /// Too many requests (HTTP 429).
    #[error("rate limited: {message}")]
    RateLimit {
        message: String,
        code: Option<String>,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout(#[source] Box<dyn StdError + Send + Sync>),

    /// Connection-level failure (DNS, TLS, refused connection, ...).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn StdError + Send + Sync>),

    /// Response body was not the expected JSON.
    #[error("failed to parse API response (HTTP {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: TransportError,
    },

    /// Any other non-2xx response.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// One of the request constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid base URL {url:?}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// A request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] TransportError),
}

impl DripError {
    /// Map a non-2xx response to the matching error kind.
    pub(crate) fn from_status(status: u16, body: ApiErrorBody) -> Self {
        let ApiErrorBody { message, code } = body;
        match status {
            401 => Self::Authentication { message, code },
            404 => Self::NotFound { message, code },
            429 => Self::RateLimit { message, code },
            _ => Self::Api {
                status,
                message,
                code,
            },
        }
    }

    /// HTTP status code, or 0 for errors raised before or below HTTP.
    pub fn status(&self) -> u16 {
        match self {
            Self::Authentication { .. } => 401,
            Self::NotFound { .. } => 404,
            Self::RateLimit { .. } => 429,
            Self::Parse { status, .. } | Self::Api { status, .. } => *status,
            Self::MissingCredential
            | Self::Timeout(_)
            | Self::Network(_)
            | Self::Validation(_)
            | Self::InvalidBaseUrl { .. }
            | Self::Encode(_) => 0,
        }
    }

    /// Machine-readable code: the server's `code` when present, otherwise a fixed default.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::MissingCredential => Some("NO_API_KEY"),
            Self::Authentication { code, .. } => code.as_deref().or(Some("UNAUTHORIZED")),
            Self::NotFound { code, .. } => code.as_deref().or(Some("NOT_FOUND")),
            Self::RateLimit { code, .. } => code.as_deref().or(Some("RATE_LIMITED")),
            Self::Timeout(_) => Some("TIMEOUT"),
            Self::Network(_) => Some("NETWORK_ERROR"),
            Self::Parse { .. } => Some("PARSE_ERROR"),
            Self::Api { code, .. } => code.as_deref(),
            Self::Validation(_) => Some("VALIDATION_ERROR"),
            Self::InvalidBaseUrl { .. } => Some("INVALID_BASE_URL"),
            Self::Encode(_) => Some("ENCODE_ERROR"),
        }
    }

    /// Whether retrying the same call later may succeed.
    ///
    /// The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) | Self::RateLimit { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(message: &str, code: Option<&str>) -> ApiErrorBody {
        ApiErrorBody {
            message: message.to_owned(),
            code: code.map(str::to_owned),
        }
    }

    #[test]
    fn status_mapping_selects_kind() {
        assert!(matches!(
            DripError::from_status(401, body("bad key", None)),
            DripError::Authentication { .. }
        ));
        assert!(matches!(
            DripError::from_status(404, body("missing", None)),
            DripError::NotFound { .. }
        ));
        assert!(matches!(
            DripError::from_status(429, body("slow down", None)),
            DripError::RateLimit { .. }
        ));

        let err = DripError::from_status(422, body("invalid", Some("VALIDATION")));
        match &err {
            DripError::Api {
                status,
                message,
                code,
            } => {
                assert_eq!(*status, 422);
                assert_eq!(message, "invalid");
                assert_eq!(code.as_deref(), Some("VALIDATION"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_and_code_accessors() {
        let err = DripError::from_status(401, body("bad key", None));
        assert_eq!(err.status(), 401);
        assert_eq!(err.code(), Some("UNAUTHORIZED"));

        let err = DripError::from_status(404, body("gone", Some("CUSTOMER_NOT_FOUND")));
        assert_eq!(err.code(), Some("CUSTOMER_NOT_FOUND"));

        let err = DripError::Timeout(Box::from("deadline"));
        assert_eq!(err.status(), 0);
        assert_eq!(err.code(), Some("TIMEOUT"));

        assert_eq!(DripError::MissingCredential.status(), 0);
        assert_eq!(DripError::MissingCredential.code(), Some("NO_API_KEY"));

        let err = DripError::from_status(500, body("boom", None));
        assert_eq!(err.status(), 500);
        assert_eq!(err.code(), None);
    }

    #[test]
    fn retryable_kinds() {
        assert!(DripError::Network(Box::from("refused")).is_retryable());
        assert!(DripError::from_status(503, body("down", None)).is_retryable());
        assert!(DripError::from_status(429, body("slow", None)).is_retryable());
        assert!(!DripError::from_status(400, body("bad", None)).is_retryable());
        assert!(!DripError::MissingCredential.is_retryable());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(
            DripError::MissingCredential.to_string(),
            "Drip API key is required; configure one explicitly or set DRIP_API_KEY"
        );
        assert_eq!(
            DripError::from_status(500, body("boom", None)).to_string(),
            "API error (500): boom"
        );
    }
}
