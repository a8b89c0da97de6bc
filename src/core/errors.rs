use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::core::kernel::recovery::ErrorClass;

/// Decoded body of a non-2xx response.
///
/// JSON bodies are kept as values so recovery rules can inspect `code` and
/// `message` fields; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    Json(Value),
    Text(String),
}

impl ErrorPayload {
    /// Decode a response body, falling back to raw text
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).map_or_else(|_| Self::Text(body.to_string()), Self::Json)
    }

    /// The `code` field of a JSON payload, if present
    pub fn code(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => value.get("code"),
            Self::Text(_) => None,
        }
    }

    /// The human-readable message, from `msg` or `message`
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value
                .get("msg")
                .or_else(|| value.get("message"))
                .and_then(Value::as_str),
            Self::Text(text) => Some(text.as_str()),
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{}", value),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Terminal HTTP failure carrying the status and decoded body
    #[error("API error: HTTP {status}: {payload}")]
    ApiError { status: u16, payload: ErrorPayload },

    /// A signed call was requested without usable credentials
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Clock probe failure. Only surfaced by `ClockSync::try_refresh`.
    #[error("Clock sync failed: {0}")]
    ClockSync(String),

    #[error("Retries exhausted after {attempts} attempts ({class}): {last}")]
    RetryExhausted {
        attempts: u32,
        class: ErrorClass,
        last: Box<ExchangeError>,
    },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl ExchangeError {
    /// HTTP status of the terminal API error, looking through retry exhaustion
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RetryExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Decoded error body of the terminal API error, looking through retry exhaustion
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            Self::ApiError { payload, .. } => Some(payload),
            Self::RetryExhausted { last, .. } => last.payload(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_falls_back_to_text() {
        let payload = ErrorPayload::from_body("<html>bad gateway</html>");
        assert_eq!(
            payload,
            ErrorPayload::Text("<html>bad gateway</html>".to_string())
        );
        assert!(payload.code().is_none());
    }

    #[test]
    fn test_payload_reads_code_and_message() {
        let payload =
            ErrorPayload::from_body(r#"{"code":-1021,"msg":"Timestamp outside recvWindow"}"#);
        assert_eq!(payload.code(), Some(&json!(-1021)));
        assert_eq!(payload.message(), Some("Timestamp outside recvWindow"));
    }

    #[test]
    fn test_retry_exhausted_exposes_last_status() {
        let err = ExchangeError::RetryExhausted {
            attempts: 2,
            class: ErrorClass::InvalidTimestamp,
            last: Box::new(ExchangeError::ApiError {
                status: 400,
                payload: ErrorPayload::Json(json!({"code": -1021})),
            }),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.payload().and_then(ErrorPayload::code), Some(&json!(-1021)));
        assert!(err.to_string().contains("HTTP 400"));
    }
}
