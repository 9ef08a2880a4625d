//! HTTP client error types.

use std::time::Duration;
use thiserror::Error;

use crate::response::Response;
use http::StatusCode;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The server answered with a status code outside `[200, 300)`.
    ///
    /// Carries the full response so callers can inspect headers and body.
    #[error("HTTP error {status}")]
    Http {
        /// HTTP status code.
        status: StatusCode,
        /// The complete response as received.
        response: Response,
    },

    /// The per-attempt deadline elapsed before the transport answered.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be addressed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection, DNS, body-read, or JSON-codec fault, passed through
    /// from the underlying transport verbatim.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HttpClientError {
    /// Wrap an arbitrary fault as a transport error.
    pub fn transport<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(error))
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Get the HTTP status code if the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HttpClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::transport(error)
    }
}

impl From<serde_json::Error> for HttpClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::transport(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;

    fn response_with_status(status: u16) -> Response {
        Response::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            "",
            "http://localhost/".parse().unwrap(),
        )
    }

    #[test]
    fn test_status_code_accessor() {
        let err = HttpClientError::Http {
            status: StatusCode::NOT_FOUND,
            response: response_with_status(404),
        };
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_timeout());

        let err = HttpClientError::Timeout(Duration::from_secs(5));
        assert_eq!(err.status_code(), None);
        assert!(err.is_timeout());
    }

    #[test]
    fn test_json_faults_surface_as_transport() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = HttpClientError::from(json_err);
        assert!(matches!(err, HttpClientError::Transport(_)));
    }
}
