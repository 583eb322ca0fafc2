//! Validation telemetry
//!
//! In-memory counters of accepted and rejected envelopes, for diagnostics
//! only. Nothing else in the engine reads them.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::validation::{EngineError, ErrorCode, ValidationResult};

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub accepted: u64,
    pub rejected: u64,
    /// Rejections per error code
    pub errors: BTreeMap<ErrorCode, u64>,
    pub last_error: Option<EngineError>,
}

/// Thread-safe validation counters
#[derive(Debug, Default)]
pub struct ValidationTelemetry {
    inner: Mutex<TelemetrySnapshot>,
}

impl ValidationTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.inner.lock().accepted += 1;
    }

    pub fn record_error(&self, error: &EngineError) {
        debug!(code = %error.code, message = %error.message, "event rejected");

        let mut inner = self.inner.lock();
        inner.rejected += 1;
        *inner.errors.entry(error.code).or_insert(0) += 1;
        inner.last_error = Some(error.clone());
    }

    /// Record either outcome of a validation call
    pub fn record<T>(&self, result: &ValidationResult<T>) {
        match result {
            Ok(_) => self.record_success(),
            Err(error) => self.record_error(error),
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.inner.lock().clone()
    }

    pub fn reset(&self) {
        *self.inner.lock() = TelemetrySnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;

    #[test]
    fn test_counts_outcomes_per_code() {
        let telemetry = ValidationTelemetry::new();

        telemetry.record_success();
        telemetry.record_error(&EngineError::new(ErrorCode::MissingField, "missing name"));
        telemetry.record_error(&EngineError::new(ErrorCode::MissingField, "missing from"));
        telemetry.record_error(&EngineError::new(ErrorCode::UnknownType, "bad type"));

        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.accepted, 1);
        assert_eq!(snapshot.rejected, 3);
        assert_eq!(snapshot.errors[&ErrorCode::MissingField], 2);
        assert_eq!(snapshot.errors[&ErrorCode::UnknownType], 1);
        assert_eq!(snapshot.last_error.unwrap().message, "bad type");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let telemetry = ValidationTelemetry::new();
        let before = telemetry.snapshot();
        telemetry.record_success();
        assert_eq!(before.accepted, 0);
        assert_eq!(telemetry.snapshot().accepted, 1);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let telemetry = ValidationTelemetry::new();
        telemetry.record(&validate(&json!({"type": "NOPE"})));
        telemetry.record_success();

        telemetry.reset();
        assert_eq!(telemetry.snapshot(), TelemetrySnapshot::default());
    }

    #[test]
    fn test_record_uses_result_discriminant() {
        let telemetry = ValidationTelemetry::new();
        telemetry.record(&validate(&json!({
            "id": "e1",
            "type": "MEETING_LOCKED",
            "actor": {"name": "主持人", "role": "host"},
            "payload": {},
            "timestamp": 1,
            "version": 1
        })));
        telemetry.record(&validate(&json!(null)));

        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.accepted, 1);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.errors[&ErrorCode::InvalidEvent], 1);
    }
}
