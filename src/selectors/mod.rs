//! Replay selectors
//!
//! Pure functions that fold an ordered event sequence (the whole log or any
//! prefix of it) into derived views:
//! - `replay`: lifecycle state and the meeting snapshot
//! - `timeline`: display rows for the event timeline
//! - `metrics`: aggregate counts
//!
//! Nothing is cached between calls. Scrubbing to an earlier index is just
//! replaying a shorter prefix.

mod metrics;
mod replay;
mod timeline;

pub use metrics::build_event_metrics;
pub use replay::{build_snapshot, get_state_from_events};
pub use timeline::build_event_timeline;

use serde_json::Value;

use crate::protocol::UNKNOWN_LABEL;
use crate::types::Event;

/// Loose boolean reading of a payload value
///
/// Selectors tolerate events that skipped validation, so `0`, `""` and
/// `null` read as false and any other present value as true.
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Non-empty string field of the payload
pub(crate) fn payload_str<'a>(event: &'a Event, field: &str) -> Option<&'a str> {
    event
        .payload_field(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Member an event refers to: payload name, then actor name
pub(crate) fn resolve_member_name(event: &Event) -> &str {
    payload_str(event, "name")
        .or_else(|| Some(event.actor.name.as_str()).filter(|name| !name.is_empty()))
        .unwrap_or(UNKNOWN_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, ActorRole, EventType, PayloadMap};
    use serde_json::json;

    #[test]
    fn test_truthy_follows_loose_boolean_rules() {
        assert!(!truthy(None));
        assert!(!truthy(Some(&Value::Null)));
        assert!(!truthy(Some(&json!(false))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!(1))));
        assert!(truthy(Some(&json!("no"))));
        assert!(truthy(Some(&json!([]))));
    }

    #[test]
    fn test_member_name_prefers_payload() {
        let mut payload = PayloadMap::new();
        payload.insert("name".to_string(), json!("李四"));
        let event = Event::with_timestamp(
            EventType::UserJoined,
            Some(Actor::new("主持人A", ActorRole::Host)),
            payload,
            1,
        );
        assert_eq!(resolve_member_name(&event), "李四");

        let event = Event::with_timestamp(
            EventType::UserJoined,
            Some(Actor::new("王五", ActorRole::Participant)),
            PayloadMap::new(),
            1,
        );
        assert_eq!(resolve_member_name(&event), "王五");
    }

    #[test]
    fn test_non_string_member_name_falls_back_to_actor() {
        let mut payload = PayloadMap::new();
        payload.insert("name".to_string(), json!(123));
        let event = Event::with_timestamp(
            EventType::UserJoined,
            Some(Actor::new("王五", ActorRole::Participant)),
            payload,
            1,
        );
        assert_eq!(payload_str(&event, "name"), None);
        assert_eq!(resolve_member_name(&event), "王五");
    }
}
