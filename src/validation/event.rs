//! Event envelope validation
//!
//! Checks run in a fixed order and the first failure wins:
//! shape, known type, protocol version, required fields. A payload that is
//! not a mapping (null included) already fails the shape check, so
//! `INVALID_PAYLOAD` is never produced for untrusted envelopes.

use serde_json::{json, Value};

use super::error::{EngineError, ErrorCode};
use crate::protocol::{payload_schema, EVENT_VERSION};
use crate::types::{Actor, Event, EventType, PayloadMap};

/// Result of validating an event
pub type ValidationResult<T = Event> = Result<T, EngineError>;

/// Envelope fields after the shape check, not yet interpreted
struct RawEnvelope<'a> {
    id: &'a str,
    event_type: &'a str,
    actor: Actor,
    payload: Option<&'a PayloadMap>,
    timestamp: i64,
    version: f64,
}

/// Validate an untrusted JSON envelope and return the normalized event
///
/// A missing payload is normalized to an empty mapping. The function is
/// pure; feed the result into [`crate::telemetry::ValidationTelemetry`].
pub fn validate(envelope: &Value) -> ValidationResult {
    let raw = check_shape(envelope)?;

    let event_type: EventType = raw.event_type.parse().map_err(|_| {
        EngineError::with_detail(
            ErrorCode::UnknownType,
            "unknown event type",
            json!({ "type": raw.event_type }),
        )
    })?;

    check_version(raw.version)?;

    // the shape check already refused anything but a mapping
    let payload = raw.payload.cloned().unwrap_or_default();

    check_required_fields(event_type, &payload)?;

    Ok(Event {
        id: raw.id.to_string(),
        event_type,
        actor: raw.actor,
        payload,
        timestamp: raw.timestamp,
        version: EVENT_VERSION,
    })
}

/// Validate an event that is already typed (version and required fields)
pub fn validate_event(event: &Event) -> ValidationResult<()> {
    check_version(f64::from(event.version))?;
    check_required_fields(event.event_type, &event.payload)
}

fn check_shape(envelope: &Value) -> ValidationResult<RawEnvelope<'_>> {
    let Some(object) = envelope.as_object() else {
        return Err(invalid_event(vec!["event: expected an object".to_string()]));
    };

    let mut issues = Vec::new();

    let id = non_empty_str(object.get("id"));
    if id.is_none() {
        issues.push("id: expected a non-empty string".to_string());
    }

    let event_type = non_empty_str(object.get("type"));
    if event_type.is_none() {
        issues.push("type: expected a non-empty string".to_string());
    }

    let actor = match object.get("actor").and_then(Value::as_object) {
        Some(actor) => {
            let name = non_empty_str(actor.get("name"));
            let role = non_empty_str(actor.get("role"));
            if name.is_none() {
                issues.push("actor.name: expected a non-empty string".to_string());
            }
            if role.is_none() {
                issues.push("actor.role: expected a non-empty string".to_string());
            }
            name.zip(role).map(|(name, role)| Actor::new(name, role))
        }
        None => {
            issues.push("actor: expected an object".to_string());
            None
        }
    };

    // absent means empty; null or any other non-mapping is malformed
    let payload = match object.get("payload") {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            issues.push("payload: expected a mapping".to_string());
            None
        }
    };

    let timestamp = object.get("timestamp").and_then(as_millis);
    if timestamp.is_none() {
        issues.push("timestamp: expected an integer number of milliseconds".to_string());
    }

    let version = object.get("version").and_then(Value::as_f64);
    if version.is_none() {
        issues.push("version: expected a number".to_string());
    }

    match (id, event_type, actor, timestamp, version) {
        (Some(id), Some(event_type), Some(actor), Some(timestamp), Some(version))
            if issues.is_empty() =>
        {
            Ok(RawEnvelope {
                id,
                event_type,
                actor,
                payload,
                timestamp,
                version,
            })
        }
        _ => Err(invalid_event(issues)),
    }
}

fn check_version(version: f64) -> ValidationResult<()> {
    if version == f64::from(EVENT_VERSION) {
        Ok(())
    } else {
        Err(EngineError::with_detail(
            ErrorCode::InvalidVersion,
            "event version mismatch",
            json!({ "version": version, "expected": EVENT_VERSION }),
        ))
    }
}

fn check_required_fields(event_type: EventType, payload: &PayloadMap) -> ValidationResult<()> {
    let schema = payload_schema(event_type);
    match schema
        .required
        .iter()
        .find(|field| payload.get(**field).map_or(true, Value::is_null))
    {
        Some(field) => Err(EngineError::with_detail(
            ErrorCode::MissingField,
            "payload is missing a required field",
            json!({ "field": field }),
        )),
        None => Ok(()),
    }
}

fn invalid_event(issues: Vec<String>) -> EngineError {
    EngineError::with_detail(
        ErrorCode::InvalidEvent,
        "malformed event envelope",
        json!({ "issues": issues }),
    )
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Millisecond timestamp, only when the number converts without loss
fn as_millis(value: &Value) -> Option<i64> {
    if let Some(millis) = value.as_i64() {
        return Some(millis);
    }
    // 2^63 is exactly representable; anything at or beyond it overflows i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    value
        .as_f64()
        .filter(|millis| millis.is_finite() && millis.fract() == 0.0)
        .filter(|millis| (-LIMIT..LIMIT).contains(millis))
        .map(|millis| millis as i64)
}
