use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Error object synthesized for failures that never produced an HTTP status.
///
/// Mirrors the `{ message, details, hint, code }` shape PostgREST uses for its
/// own error bodies, so callers can handle both kinds the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorShape {
    pub message: String,
    pub details: String,
    pub hint: String,
    pub code: String,
}

/// Failure raised by a [`Transport`](crate::Transport) before any response exists.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network or protocol failure reported by reqwest.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The caller's cancellation token fired while the request was in flight.
    #[error("The operation was aborted")]
    Aborted,

    /// The request could not be assembled (bad header, bad URL, ...).
    #[error("{0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Short class name of the failure, used as the message prefix.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Http(_) => "FetchError",
            Self::Aborted => "AbortError",
            Self::InvalidRequest(_) => "RequestError",
        }
    }

    /// Machine-readable code, empty when the failure has none.
    pub fn code(&self) -> String {
        match self {
            Self::Http(e) => {
                if e.is_timeout() {
                    "ETIMEDOUT".to_string()
                } else if e.is_connect() {
                    "ECONNREFUSED".to_string()
                } else {
                    e.status().map(|s| s.as_u16().to_string()).unwrap_or_default()
                }
            }
            Self::Aborted => "ABORT_ERR".to_string(),
            Self::InvalidRequest(_) => String::new(),
        }
    }

    /// Source chain of the error, one cause per line.
    pub fn chain(&self) -> String {
        let mut lines = Vec::new();
        let mut source = self.source();
        while let Some(cause) = source {
            lines.push(cause.to_string());
            source = cause.source();
        }
        lines.join("\n")
    }
}

impl From<&TransportError> for ErrorShape {
    fn from(err: &TransportError) -> Self {
        Self {
            message: format!("{}: {}", err.name(), err),
            details: err.chain(),
            hint: String::new(),
            code: err.code(),
        }
    }
}

/// All errors that can surface from a PostgREST request.
#[derive(Debug, thiserror::Error)]
pub enum PostgrestError {
    /// Error body returned by the server, passed through untouched.
    ///
    /// Structured bodies keep their JSON form; bodies that are not JSON are
    /// carried as a JSON string.
    #[error("PostgREST error: {}", api_message(.0))]
    Api(JsonValue),

    /// Transport failure folded into an envelope (status 0).
    #[error("{}", .0.message)]
    Fetch(ErrorShape),

    /// Transport failure propagated under the throw-on-error policy.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PostgrestError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The `message` field of the error, when it has one.
    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }

    /// The `details` field of the error, when it has one.
    pub fn details(&self) -> Option<&str> {
        self.field("details")
    }

    /// The `hint` field of the error, when it has one.
    pub fn hint(&self) -> Option<&str> {
        self.field("hint")
    }

    /// The `code` field of the error, when it has one.
    pub fn code(&self) -> Option<&str> {
        self.field("code")
    }

    /// The raw server body for [`PostgrestError::Api`].
    pub fn body(&self) -> Option<&JsonValue> {
        match self {
            Self::Api(body) => Some(body),
            _ => None,
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        match self {
            Self::Api(body) => body.get(name).and_then(JsonValue::as_str),
            Self::Fetch(shape) => Some(match name {
                "message" => shape.message.as_str(),
                "details" => shape.details.as_str(),
                "hint" => shape.hint.as_str(),
                _ => shape.code.as_str(),
            }),
            _ => None,
        }
    }
}

fn api_message(body: &JsonValue) -> String {
    match body {
        JsonValue::String(text) => text.clone(),
        other => other
            .get("message")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

impl From<serde_json::Error> for PostgrestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for PostgrestError {
    fn from(e: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {e}"))
    }
}

/// Result alias using PostgrestError.
pub type PostgrestResult<T> = Result<T, PostgrestError>;
