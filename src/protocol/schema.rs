//! Payload contract per event type
//!
//! The validator checks externally sourced events against these descriptors.
//! In-process producers get the same guarantees from [`crate::types::EventPayload`].

use crate::types::EventType;

/// Protocol version stamped on every event; no other version is accepted
pub const EVENT_VERSION: u32 = 1;

/// Required and optional payload fields for one event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSchema {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl PayloadSchema {
    const fn new(required: &'static [&'static str], optional: &'static [&'static str]) -> Self {
        Self { required, optional }
    }

    /// Whether a field is part of the contract at all
    pub fn knows(&self, field: &str) -> bool {
        self.required.contains(&field) || self.optional.contains(&field)
    }
}

const LIFECYCLE: PayloadSchema = PayloadSchema::new(&[], &["reason"]);
const MEMBER: PayloadSchema = PayloadSchema::new(&["name"], &[]);
const TOGGLE: PayloadSchema = PayloadSchema::new(&["enabled"], &[]);
const EMPTY: PayloadSchema = PayloadSchema::new(&[], &[]);

/// Look up the payload contract for an event type
pub fn payload_schema(event_type: EventType) -> PayloadSchema {
    match event_type {
        EventType::MeetingStarted
        | EventType::MeetingPaused
        | EventType::MeetingResumed
        | EventType::MeetingEnded => LIFECYCLE,
        EventType::UserJoined
        | EventType::UserLeft
        | EventType::SpeakerAllowed
        | EventType::WaitApproved
        | EventType::WaitRejected => MEMBER,
        EventType::RoleChanged => PayloadSchema::new(&["name", "from", "to"], &[]),
        EventType::MicToggled | EventType::CameraToggled => TOGGLE,
        EventType::HandRaised => PayloadSchema::new(&[], &["raisedAt"]),
        EventType::HandLowered
        | EventType::ScreenShareStarted
        | EventType::ScreenShareStopped
        | EventType::MeetingLocked
        | EventType::MeetingUnlocked => EMPTY,
        EventType::MicPolicyChanged => PayloadSchema::new(&["allowParticipantMic"], &[]),
    }
}
