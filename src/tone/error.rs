//! Tone service error types

use serde::Deserialize;
use thiserror::Error;

/// Tone service error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToneError {
    pub kind: ToneErrorKind,
    pub message: String,
    /// HTTP status when a response was received
    pub status: Option<u16>,
}

impl ToneError {
    pub fn new(kind: ToneErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ToneErrorKind::Transport, message)
    }

    pub fn protocol(status: u16, message: impl Into<String>) -> Self {
        Self::new(ToneErrorKind::Protocol, message).with_status(status)
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::new(ToneErrorKind::Contract, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToneErrorKind::Internal, message)
    }

    /// Build a protocol error from a non-2xx response body.
    ///
    /// The service reports failures as `{"detail": ..}` (framework errors)
    /// or `{"message": ..}`; anything else gets a synthesized message.
    pub fn from_error_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| format!("Server error ({status})"));
        Self::protocol(status, message)
    }
}

/// Error classification, used for logging only: every kind ends in the
/// same fallback transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneErrorKind {
    /// No response within the wait window, or connection-level failure
    Transport,
    /// Response received with a status outside 2xx
    Protocol,
    /// 2xx response whose body cannot be read as an analysis
    Contract,
    /// The service call panicked
    Internal,
}

impl ToneErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Contract => "contract",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ToneErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        let detail = match self.detail {
            Some(serde_json::Value::String(s)) => Some(s),
            // Validation failures carry a structured detail list
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let non_blank = |m: &String| !m.trim().is_empty();
        detail
            .filter(non_blank)
            .or_else(|| self.message.filter(non_blank))
    }
}
