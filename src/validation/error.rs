//! Structured validation errors
//!
//! Errors are returned as values and never cross the validation boundary as
//! panics. Callers match on [`ErrorCode`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validation failure categories, serialized as their wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Envelope fails the structural shape checks
    InvalidEvent,
    /// Event type outside the catalogue
    UnknownType,
    /// A required payload field is absent or null
    MissingField,
    /// Protocol version mismatch
    InvalidVersion,
    /// Payload is not a mapping; envelopes report this as `InvalidEvent`
    /// because the shape check sees it first
    InvalidPayload,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidEvent => "INVALID_EVENT",
            ErrorCode::UnknownType => "UNKNOWN_TYPE",
            ErrorCode::MissingField => "MISSING_FIELD",
            ErrorCode::InvalidVersion => "INVALID_VERSION",
            ErrorCode::InvalidPayload => "INVALID_PAYLOAD",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected event, with machine-readable detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default)]
    pub detail: Value,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl EngineError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_detail(code, message, Value::Object(Default::default()))
    }

    pub fn with_detail(code: ErrorCode, message: impl Into<String>, detail: Value) -> Self {
        Self {
            code,
            message: message.into(),
            detail,
            timestamp: crate::utils::current_timestamp_millis(),
        }
    }
}
