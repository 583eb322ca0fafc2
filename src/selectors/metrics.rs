//! Aggregate event metrics for status panels and the CLI

use crate::types::{Event, EventMetrics};

/// Count events by type and actor role, and find the latest timestamp
///
/// Empty roles and non-positive timestamps are skipped rather than counted.
pub fn build_event_metrics(events: &[Event]) -> EventMetrics {
    let mut metrics = EventMetrics {
        total: events.len(),
        ..Default::default()
    };

    for event in events {
        *metrics.by_type.entry(event.event_type).or_insert(0) += 1;

        if !event.actor.role.is_empty() {
            *metrics
                .by_role
                .entry(event.actor.role.as_str().to_string())
                .or_insert(0) += 1;
        }

        if event.timestamp > metrics.last_event_at {
            metrics.last_event_at = event.timestamp;
        }
    }

    metrics
}
