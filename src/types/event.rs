//! Event types for the meeting event log
//!
//! Events are immutable records of what happened in a meeting. The meeting's
//! lifecycle state, participant count and access flags are all derived by
//! replaying these events in append order.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::payload::EventPayload;
use crate::protocol::EVENT_VERSION;

/// Untyped payload carried on the wire and in persisted logs
pub type PayloadMap = serde_json::Map<String, serde_json::Value>;

/// Event types recorded for a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    MeetingStarted,
    MeetingPaused,
    MeetingResumed,
    MeetingEnded,
    UserJoined,
    UserLeft,
    RoleChanged,
    MicToggled,
    CameraToggled,
    HandRaised,
    HandLowered,
    ScreenShareStarted,
    ScreenShareStopped,
    MeetingLocked,
    MeetingUnlocked,
    MicPolicyChanged,
    SpeakerAllowed,
    WaitApproved,
    WaitRejected,
}

impl EventType {
    /// Every known event type, in catalogue order
    pub const ALL: [EventType; 19] = [
        EventType::MeetingStarted,
        EventType::MeetingPaused,
        EventType::MeetingResumed,
        EventType::MeetingEnded,
        EventType::UserJoined,
        EventType::UserLeft,
        EventType::RoleChanged,
        EventType::MicToggled,
        EventType::CameraToggled,
        EventType::HandRaised,
        EventType::HandLowered,
        EventType::ScreenShareStarted,
        EventType::ScreenShareStopped,
        EventType::MeetingLocked,
        EventType::MeetingUnlocked,
        EventType::MicPolicyChanged,
        EventType::SpeakerAllowed,
        EventType::WaitApproved,
        EventType::WaitRejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::MeetingStarted => "MEETING_STARTED",
            EventType::MeetingPaused => "MEETING_PAUSED",
            EventType::MeetingResumed => "MEETING_RESUMED",
            EventType::MeetingEnded => "MEETING_ENDED",
            EventType::UserJoined => "USER_JOINED",
            EventType::UserLeft => "USER_LEFT",
            EventType::RoleChanged => "ROLE_CHANGED",
            EventType::MicToggled => "MIC_TOGGLED",
            EventType::CameraToggled => "CAMERA_TOGGLED",
            EventType::HandRaised => "HAND_RAISED",
            EventType::HandLowered => "HAND_LOWERED",
            EventType::ScreenShareStarted => "SCREEN_SHARE_STARTED",
            EventType::ScreenShareStopped => "SCREEN_SHARE_STOPPED",
            EventType::MeetingLocked => "MEETING_LOCKED",
            EventType::MeetingUnlocked => "MEETING_UNLOCKED",
            EventType::MicPolicyChanged => "MIC_POLICY_CHANGED",
            EventType::SpeakerAllowed => "SPEAKER_ALLOWED",
            EventType::WaitApproved => "WAIT_APPROVED",
            EventType::WaitRejected => "WAIT_REJECTED",
        }
    }

    /// Whether this type drives a lifecycle transition
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            EventType::MeetingStarted
                | EventType::MeetingPaused
                | EventType::MeetingResumed
                | EventType::MeetingEnded
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known event type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type '{0}'")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

/// An immutable event in a meeting's log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Collision-resistant identifier (`<TYPE>-<timestamp>-<suffix>`)
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: EventType,

    #[serde(default)]
    pub actor: Actor,

    #[serde(default)]
    pub payload: PayloadMap,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    pub version: u32,
}

impl Event {
    /// Create an event stamped with the current wall-clock time
    pub fn new(event_type: EventType, actor: Option<Actor>, payload: PayloadMap) -> Self {
        Self::with_timestamp(
            event_type,
            actor,
            payload,
            crate::utils::current_timestamp_millis(),
        )
    }

    /// Create an event with a producer-supplied timestamp
    ///
    /// No validation happens here. A missing actor, or one with an empty
    /// name or role, falls back to the system actor.
    pub fn with_timestamp(
        event_type: EventType,
        actor: Option<Actor>,
        payload: PayloadMap,
        timestamp: i64,
    ) -> Self {
        Self {
            id: generate_event_id(event_type, timestamp),
            event_type,
            actor: actor.unwrap_or_default().or_system_defaults(),
            payload,
            timestamp,
            version: EVENT_VERSION,
        }
    }

    /// Create an event from a typed payload; the variant decides the type
    pub fn from_payload(payload: EventPayload, actor: Option<Actor>) -> Self {
        let event_type = payload.event_type();
        Self::new(event_type, actor, payload.into_map())
    }

    /// Parse the payload into its typed shape
    pub fn parse_payload(&self) -> Result<EventPayload, serde_json::Error> {
        EventPayload::from_parts(self.event_type, &self.payload)
    }

    /// Look up a raw payload field
    pub fn payload_field(&self, field: &str) -> Option<&serde_json::Value> {
        self.payload.get(field)
    }
}

fn generate_event_id(event_type: EventType, timestamp: i64) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", event_type, timestamp, &suffix[..6])
}
