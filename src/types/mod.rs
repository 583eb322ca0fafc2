//! Data types for the meeting engine
//!
//! This module contains the event envelope, typed payloads, actors, lifecycle
//! actions and the derived views built from an event log.

mod action;
mod actor;
mod event;
mod payload;
mod view;

pub use action::{ActionKey, MeetingAction, UnknownAction};
pub use actor::{Actor, ActorRole, SYSTEM_ACTOR_NAME};
pub use event::{Event, EventType, PayloadMap, UnknownEventType};
pub use payload::{
    EmptyData, EventPayload, HandRaisedData, LifecycleData, MemberData, MicPolicyData,
    RoleChangedData, ToggleData,
};
pub use view::{EventMetrics, EventStats, MeetingSnapshot, TimelineItem};
