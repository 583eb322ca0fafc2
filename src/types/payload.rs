//! Typed payloads, one shape per event type

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::actor::ActorRole;
use super::event::{EventType, PayloadMap};

/// Payload for the four lifecycle events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Payload naming a single member (join, leave, speaker and waiting-room decisions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberData {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChangedData {
    pub name: String,
    pub from: ActorRole,
    pub to: ActorRole,
}

/// Payload for microphone and camera toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleData {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandRaisedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raised_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicPolicyData {
    pub allow_participant_mic: bool,
}

/// Payload for events that carry no fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyData {}

/// Event payload tagged by event type
///
/// Producers that build events in-process use this to get the payload shape
/// right at compile time. Events from outside still go through the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    MeetingStarted(LifecycleData),
    MeetingPaused(LifecycleData),
    MeetingResumed(LifecycleData),
    MeetingEnded(LifecycleData),
    UserJoined(MemberData),
    UserLeft(MemberData),
    RoleChanged(RoleChangedData),
    MicToggled(ToggleData),
    CameraToggled(ToggleData),
    HandRaised(HandRaisedData),
    HandLowered(EmptyData),
    ScreenShareStarted(EmptyData),
    ScreenShareStopped(EmptyData),
    MeetingLocked(EmptyData),
    MeetingUnlocked(EmptyData),
    MicPolicyChanged(MicPolicyData),
    SpeakerAllowed(MemberData),
    WaitApproved(MemberData),
    WaitRejected(MemberData),
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::MeetingStarted(_) => EventType::MeetingStarted,
            EventPayload::MeetingPaused(_) => EventType::MeetingPaused,
            EventPayload::MeetingResumed(_) => EventType::MeetingResumed,
            EventPayload::MeetingEnded(_) => EventType::MeetingEnded,
            EventPayload::UserJoined(_) => EventType::UserJoined,
            EventPayload::UserLeft(_) => EventType::UserLeft,
            EventPayload::RoleChanged(_) => EventType::RoleChanged,
            EventPayload::MicToggled(_) => EventType::MicToggled,
            EventPayload::CameraToggled(_) => EventType::CameraToggled,
            EventPayload::HandRaised(_) => EventType::HandRaised,
            EventPayload::HandLowered(_) => EventType::HandLowered,
            EventPayload::ScreenShareStarted(_) => EventType::ScreenShareStarted,
            EventPayload::ScreenShareStopped(_) => EventType::ScreenShareStopped,
            EventPayload::MeetingLocked(_) => EventType::MeetingLocked,
            EventPayload::MeetingUnlocked(_) => EventType::MeetingUnlocked,
            EventPayload::MicPolicyChanged(_) => EventType::MicPolicyChanged,
            EventPayload::SpeakerAllowed(_) => EventType::SpeakerAllowed,
            EventPayload::WaitApproved(_) => EventType::WaitApproved,
            EventPayload::WaitRejected(_) => EventType::WaitRejected,
        }
    }

    /// Lower the payload into the untyped map stored on an event
    pub fn into_map(self) -> PayloadMap {
        match serde_json::to_value(&self) {
            Ok(Value::Object(mut tagged)) => match tagged.remove("payload") {
                Some(Value::Object(map)) => map,
                _ => PayloadMap::new(),
            },
            _ => PayloadMap::new(),
        }
    }

    /// Parse an untyped payload for the given event type
    pub fn from_parts(event_type: EventType, payload: &PayloadMap) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::json!({
            "type": event_type,
            "payload": payload,
        }))
    }
}
