//! Derived views produced by replaying a meeting's events
//!
//! Nothing here is stored. Each value is recomputed from an event prefix.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::{Event, EventType};
use crate::machine::MeetingState;

/// Point-in-time view of a meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSnapshot {
    pub state: MeetingState,
    pub state_label: String,
    pub participant_count: usize,
    pub allow_participant_mic: bool,
    pub meeting_locked: bool,
}

/// One display row of the event timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub time_label: String,
    pub title: String,
    pub actor_label: String,
    pub detail: String,
    pub raw: Event,
}

/// Aggregate counts over an event sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetrics {
    pub total: usize,
    pub by_type: BTreeMap<EventType, usize>,
    pub by_role: BTreeMap<String, usize>,
    /// Latest event timestamp in milliseconds, 0 when there is none
    pub last_event_at: i64,
}

/// Metrics with the last event time already formatted for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total: usize,
    pub last_time_label: String,
    pub by_type: BTreeMap<EventType, usize>,
    pub by_role: BTreeMap<String, usize>,
}

impl From<EventMetrics> for EventStats {
    fn from(metrics: EventMetrics) -> Self {
        let last_time_label = if metrics.last_event_at > 0 {
            crate::protocol::format_event_time(metrics.last_event_at)
        } else {
            String::new()
        };
        Self {
            total: metrics.total,
            last_time_label,
            by_type: metrics.by_type,
            by_role: metrics.by_role,
        }
    }
}
