//! Lifecycle state and snapshot replay

use std::collections::HashSet;

use super::{resolve_member_name, truthy};
use crate::machine::{MeetingMachine, MeetingState};
use crate::types::{Event, EventType, MeetingSnapshot};

/// Fold the lifecycle events of `events` through `machine`
///
/// Starts from the machine's initial state; non-lifecycle events are skipped.
pub fn get_state_from_events(events: &[Event], machine: &MeetingMachine) -> MeetingState {
    events
        .iter()
        .fold(machine.initial_state(), |state, event| machine.apply(state, event))
}

/// Replay `events` into a point-in-time snapshot
///
/// Participants are tracked by resolved member name. The mic policy and lock
/// flags take the latest value seen, defaulting to mic allowed and unlocked.
pub fn build_snapshot(events: &[Event], machine: &MeetingMachine) -> MeetingSnapshot {
    let mut participants: HashSet<&str> = HashSet::new();
    let mut allow_participant_mic = true;
    let mut meeting_locked = false;

    for event in events {
        match event.event_type {
            EventType::UserJoined => {
                participants.insert(resolve_member_name(event));
            }
            EventType::UserLeft => {
                participants.remove(resolve_member_name(event));
            }
            EventType::MicPolicyChanged => {
                allow_participant_mic = truthy(event.payload_field("allowParticipantMic"));
            }
            EventType::MeetingLocked => meeting_locked = true,
            EventType::MeetingUnlocked => meeting_locked = false,
            _ => {}
        }
    }

    let state = get_state_from_events(events, machine);
    MeetingSnapshot {
        state,
        state_label: state.label().to_string(),
        participant_count: participants.len(),
        allow_participant_mic,
        meeting_locked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, ActorRole, PayloadMap};
    use serde_json::{json, Value};

    fn event(event_type: EventType, payload: Value) -> Event {
        let payload: PayloadMap = match payload {
            Value::Object(map) => map,
            _ => PayloadMap::new(),
        };
        Event::with_timestamp(
            event_type,
            Some(Actor::new("主持人", ActorRole::Host)),
            payload,
            1704067200000,
        )
    }

    #[test]
    fn test_empty_replay_is_initial() {
        let machine = MeetingMachine::new();
        assert_eq!(get_state_from_events(&[], &machine), MeetingState::Idle);

        let snapshot = build_snapshot(&[], &machine);
        assert_eq!(snapshot.state, MeetingState::Idle);
        assert_eq!(snapshot.state_label, "待开始");
        assert_eq!(snapshot.participant_count, 0);
        assert!(snapshot.allow_participant_mic);
        assert!(!snapshot.meeting_locked);
    }

    #[test]
    fn test_full_lifecycle_replay() {
        let machine = MeetingMachine::new();
        let events = vec![
            event(EventType::MeetingStarted, json!({})),
            event(EventType::MeetingPaused, json!({})),
            event(EventType::MeetingResumed, json!({})),
            event(EventType::MeetingEnded, json!({})),
        ];

        assert_eq!(get_state_from_events(&events, &machine), MeetingState::Ended);
        assert_eq!(get_state_from_events(&events[..3], &machine), MeetingState::Live);
        assert_eq!(get_state_from_events(&events[..2], &machine), MeetingState::Paused);
    }

    #[test]
    fn test_snapshot_scenario() {
        let machine = MeetingMachine::new();
        let events = vec![
            event(EventType::MeetingStarted, json!({})),
            event(EventType::UserJoined, json!({"name": "张三"})),
            event(EventType::MicPolicyChanged, json!({"allowParticipantMic": false})),
            event(EventType::MeetingLocked, json!({})),
        ];

        let snapshot = build_snapshot(&events, &machine);
        assert_eq!(snapshot.state, MeetingState::Live);
        assert_eq!(snapshot.participant_count, 1);
        assert!(!snapshot.allow_participant_mic);
        assert!(snapshot.meeting_locked);
    }

    #[test]
    fn test_latest_wins_for_flags() {
        let machine = MeetingMachine::new();
        let events = vec![
            event(EventType::MeetingLocked, json!({})),
            event(EventType::HandRaised, json!({})),
            event(EventType::MeetingUnlocked, json!({})),
            event(EventType::MicPolicyChanged, json!({"allowParticipantMic": false})),
            event(EventType::CameraToggled, json!({"enabled": true})),
            event(EventType::MicPolicyChanged, json!({"allowParticipantMic": true})),
        ];

        let snapshot = build_snapshot(&events, &machine);
        assert!(!snapshot.meeting_locked);
        assert!(snapshot.allow_participant_mic);
    }

    #[test]
    fn test_participants_join_and_leave_by_name() {
        let machine = MeetingMachine::new();
        let events = vec![
            event(EventType::UserJoined, json!({"name": "张三"})),
            event(EventType::UserJoined, json!({"name": "李四"})),
            event(EventType::UserJoined, json!({"name": "张三"})),
            event(EventType::UserLeft, json!({"name": "李四"})),
            event(EventType::UserLeft, json!({"name": "不在会中"})),
        ];

        assert_eq!(build_snapshot(&events, &machine).participant_count, 1);
    }

    #[test]
    fn test_missing_mic_flag_reads_as_disallowed() {
        let machine = MeetingMachine::new();
        let events = vec![event(EventType::MicPolicyChanged, json!({}))];
        assert!(!build_snapshot(&events, &machine).allow_participant_mic);
    }
}
