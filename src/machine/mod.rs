//! Meeting lifecycle state machine
//!
//! A pure finite-state machine over four states. It knows nothing about the
//! UI or the event store; it only maps a state and a machine event to the
//! next state.
//!
//! ```text
//!          START           PAUSE
//!   idle ────────► live ────────► paused
//!     │             ▲  │             │
//!     │             │  │   RESUME    │
//!     │             └──┼─────────────┘
//!     │ END            │ END         │ END
//!     └───────────► ended ◄──────────┘
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Event, EventType};

/// Lifecycle state of a meeting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingState {
    #[default]
    Idle,
    Live,
    Paused,
    /// Terminal; no outgoing transitions
    Ended,
}

impl MeetingState {
    pub const ALL: [MeetingState; 4] = [
        MeetingState::Idle,
        MeetingState::Live,
        MeetingState::Paused,
        MeetingState::Ended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingState::Idle => "idle",
            MeetingState::Live => "live",
            MeetingState::Paused => "paused",
            MeetingState::Ended => "ended",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MeetingState::Idle => "待开始",
            MeetingState::Live => "进行中",
            MeetingState::Paused => "已暂停",
            MeetingState::Ended => "已结束",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, MeetingState::Ended)
    }
}

impl std::fmt::Display for MeetingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs understood by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MachineEvent {
    Start,
    Pause,
    Resume,
    End,
}

impl MachineEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineEvent::Start => "START",
            MachineEvent::Pause => "PAUSE",
            MachineEvent::Resume => "RESUME",
            MachineEvent::End => "END",
        }
    }

    /// Map a domain event type to a machine event; only lifecycle types map
    pub fn from_event_type(event_type: EventType) -> Option<Self> {
        match event_type {
            EventType::MeetingStarted => Some(MachineEvent::Start),
            EventType::MeetingPaused => Some(MachineEvent::Pause),
            EventType::MeetingResumed => Some(MachineEvent::Resume),
            EventType::MeetingEnded => Some(MachineEvent::End),
            _ => None,
        }
    }

    pub fn from_event(event: &Event) -> Option<Self> {
        Self::from_event_type(event.event_type)
    }
}

impl std::fmt::Display for MachineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown machine event '{0}'")]
pub struct UnknownMachineEvent(pub String);

impl FromStr for MachineEvent {
    type Err = UnknownMachineEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "START" => Ok(MachineEvent::Start),
            "PAUSE" => Ok(MachineEvent::Pause),
            "RESUME" => Ok(MachineEvent::Resume),
            "END" => Ok(MachineEvent::End),
            other => Err(UnknownMachineEvent(other.to_string())),
        }
    }
}

/// Outgoing transitions of a state
pub fn allowed_transitions(from: MeetingState) -> &'static [(MachineEvent, MeetingState)] {
    use MachineEvent::*;
    use MeetingState::*;
    match from {
        Idle => &[(Start, Live), (End, Ended)],
        Live => &[(Pause, Paused), (End, Ended)],
        Paused => &[(Resume, Live), (End, Ended)],
        Ended => &[],
    }
}

/// Next state for `event` in `state`; unmatched events leave the state unchanged
pub fn transition(state: MeetingState, event: MachineEvent) -> MeetingState {
    allowed_transitions(state)
        .iter()
        .find(|(on, _)| *on == event)
        .map_or(state, |(_, target)| *target)
}

/// The meeting lifecycle machine
///
/// Stateless apart from its definition, so it is cheap to copy into replay
/// functions and subscriber closures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeetingMachine {
    initial: MeetingState,
}

impl MeetingMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_state(&self) -> MeetingState {
        self.initial
    }

    pub fn transition(&self, state: MeetingState, event: MachineEvent) -> MeetingState {
        transition(state, event)
    }

    /// Apply a domain event; non-lifecycle events are ignored
    pub fn apply(&self, state: MeetingState, event: &Event) -> MeetingState {
        match MachineEvent::from_event(event) {
            Some(machine_event) => self.transition(state, machine_event),
            None => state,
        }
    }
}
