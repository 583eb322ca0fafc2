//! Meeting Engine - one user's session over one meeting's event log
//!
//! Wires the pieces together: untrusted envelopes go through validation and
//! telemetry, accepted events land in the store, the store's notifications
//! keep the live lifecycle state and the replay cursor current, and every
//! view is derived from the log on demand.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::event_store::{EventStoreConfig, KeyValueStorage, MeetingEventStore, Subscription};
use crate::machine::{MeetingMachine, MeetingState};
use crate::policy::{find_action, get_action_availability, PolicyContext};
use crate::selectors::{build_event_metrics, build_event_timeline, build_snapshot};
use crate::telemetry::{TelemetrySnapshot, ValidationTelemetry};
use crate::types::{
    ActionKey, Actor, ActorRole, Event, EventMetrics, EventPayload, EventStats, EventType,
    MeetingAction, MeetingSnapshot, PayloadMap, TimelineItem,
};
use crate::validation::{validate, EngineError};

/// Name used for locally produced events when the session has no user name
pub const DEFAULT_ACTOR_NAME: &str = "我";

pub const UNKNOWN_ACTION_REASON: &str = "未知动作";
pub const ACTION_UNAVAILABLE_REASON: &str = "当前不可操作";
pub const VIEWER_HINT: &str = "当前为参会者，仅可查看会议引擎状态";

/// Options for [`MeetingEngine::request_action`]
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    /// Recorded as the lifecycle event's `reason`
    pub reason: String,
    /// Attribute the event to someone other than the session user
    pub actor: Option<Actor>,
    /// Append even when the policy disables the action
    pub bypass_permission: bool,
}

impl ActionRequest {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Default::default()
        }
    }
}

/// Result of a lifecycle action request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub ok: bool,
    /// Why the action was refused, or the policy reason that was bypassed
    pub reason: String,
    pub event: Option<Event>,
}

impl ActionOutcome {
    fn refused(reason: &str) -> Self {
        Self {
            ok: false,
            reason: reason.to_string(),
            event: None,
        }
    }
}

/// A session over one meeting
pub struct MeetingEngine {
    machine: MeetingMachine,
    storage: Arc<dyn KeyValueStorage>,
    config: EventStoreConfig,
    store: MeetingEventStore,
    telemetry: Arc<ValidationTelemetry>,
    state: Arc<Mutex<MeetingState>>,
    replay_index: Arc<Mutex<i64>>,
    actor: Actor,
    can_moderate: bool,
    subscriptions: Vec<Subscription>,
}

impl MeetingEngine {
    /// Open a session: load the log, replay the state, subscribe to changes
    ///
    /// The session acts as a participant named [`DEFAULT_ACTOR_NAME`] until
    /// [`MeetingEngine::with_actor`] says otherwise.
    pub fn open(
        meeting_id: &str,
        storage: Arc<dyn KeyValueStorage>,
        config: &EventStoreConfig,
    ) -> Self {
        let machine = MeetingMachine::new();
        let store = MeetingEventStore::new(Some(meeting_id), Arc::clone(&storage), config);

        let mut engine = Self {
            machine,
            storage,
            config: config.clone(),
            store,
            telemetry: Arc::new(ValidationTelemetry::new()),
            state: Arc::new(Mutex::new(machine.initial_state())),
            replay_index: Arc::new(Mutex::new(-1)),
            actor: Actor::new(DEFAULT_ACTOR_NAME, ActorRole::Participant),
            can_moderate: false,
            subscriptions: Vec::new(),
        };
        engine.init_store();
        engine
    }

    /// Act as `actor`; moderation follows the actor's role
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.can_moderate = actor.role.is_moderator();
        self.actor = actor;
        self
    }

    /// Share a telemetry sink with other sessions
    pub fn with_telemetry(mut self, telemetry: Arc<ValidationTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn set_can_moderate(&mut self, can_moderate: bool) {
        self.can_moderate = can_moderate;
    }

    pub fn can_moderate(&self) -> bool {
        self.can_moderate
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn meeting_id(&self) -> Option<&str> {
        self.store.meeting_id()
    }

    /// Leave the current meeting's log and open another one
    pub fn switch_meeting(&mut self, meeting_id: &str) {
        if meeting_id.is_empty() || self.store.meeting_id() == Some(meeting_id) {
            return;
        }
        self.stop_store_subscriptions();
        self.store = MeetingEventStore::new(Some(meeting_id), Arc::clone(&self.storage), &self.config);
        self.init_store();
    }

    fn init_store(&mut self) {
        let events = self.store.load_events();
        let len = events.len() as i64;
        let replayed = crate::selectors::get_state_from_events(events, &self.machine);

        *self.state.lock() = replayed;
        *self.replay_index.lock() = len - 1;

        info!(
            meeting_id = self.store.meeting_id().unwrap_or_default(),
            events = len,
            state = %replayed,
            "opened meeting session"
        );

        let machine = self.machine;
        let state = Arc::clone(&self.state);
        let on_event = self.store.subscribe(move |event| {
            let mut state = state.lock();
            let current = *state;
            let next = machine.apply(current, event);
            if next != current {
                debug!(from = %current, to = %next, "meeting state changed");
                *state = next;
            }
        });

        let replay_index = Arc::clone(&self.replay_index);
        let on_events = self.store.subscribe_events(move |events| {
            let mut index = replay_index.lock();
            let len = events.len() as i64;
            if len == 0 {
                *index = -1;
            } else if *index < 0 || *index >= len {
                *index = len - 1;
            }
        });

        let state = Arc::clone(&self.state);
        let on_clear = self.store.subscribe_clear(move || {
            *state.lock() = machine.initial_state();
        });

        self.subscriptions = vec![on_event, on_events, on_clear];
    }

    /// Detach from the store; views still work but the live state freezes
    pub fn stop_store_subscriptions(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }

    /// Validate an untrusted envelope and append it when accepted
    pub fn dispatch(&mut self, envelope: &Value) -> Result<Event, EngineError> {
        let result = validate(envelope);
        self.telemetry.record(&result);
        let event = result?;
        self.store.append_event(event.clone());
        Ok(event)
    }

    /// Append a locally produced event
    ///
    /// Attributed to `actor`, or to the session user when `None`.
    pub fn append(
        &mut self,
        event_type: EventType,
        payload: PayloadMap,
        actor: Option<Actor>,
    ) -> Event {
        let actor = actor.unwrap_or_else(|| self.actor.clone());
        let event = Event::new(event_type, Some(actor), payload);
        self.store.append_event(event.clone());
        event
    }

    /// Append a typed payload; the variant picks the event type
    pub fn append_payload(&mut self, payload: EventPayload, actor: Option<Actor>) -> Event {
        let event_type = payload.event_type();
        self.append(event_type, payload.into_map(), actor)
    }

    /// Request a lifecycle action by key (`start`, `pause`, `resume`, `end`)
    ///
    /// Refused with the policy's reason when the action is disabled, unless
    /// the request bypasses permissions.
    pub fn request_action(&mut self, key: &str, request: ActionRequest) -> ActionOutcome {
        let Ok(key) = key.parse::<ActionKey>() else {
            return ActionOutcome::refused(UNKNOWN_ACTION_REASON);
        };

        let action = find_action(self.policy_context(), key);
        if !request.bypass_permission && !action.enabled {
            let reason = if action.reason.is_empty() {
                ACTION_UNAVAILABLE_REASON
            } else {
                action.reason.as_str()
            };
            debug!(action = %key, reason, "action refused");
            return ActionOutcome::refused(reason);
        }

        let mut payload = PayloadMap::new();
        payload.insert("reason".to_string(), Value::String(request.reason));
        let event = self.append(key.event_type(), payload, request.actor);

        ActionOutcome {
            ok: true,
            reason: action.reason,
            event: Some(event),
        }
    }

    /// Empty the log and return to the initial state
    pub fn clear(&mut self) {
        self.store.clear_events();
        *self.state.lock() = self.machine.initial_state();
    }

    /// Live lifecycle state
    pub fn state(&self) -> MeetingState {
        *self.state.lock()
    }

    pub fn state_label(&self) -> &'static str {
        self.state().label()
    }

    pub fn events(&self) -> &[Event] {
        self.store.get_events()
    }

    fn policy_context(&self) -> PolicyContext {
        PolicyContext::new(self.state(), self.can_moderate)
    }

    pub fn actions(&self) -> Vec<MeetingAction> {
        get_action_availability(self.policy_context())
    }

    /// Hint shown to users who cannot moderate; empty for moderators
    pub fn action_hint(&self) -> &'static str {
        if self.can_moderate {
            ""
        } else {
            VIEWER_HINT
        }
    }

    /// Snapshot of the whole log
    pub fn snapshot(&self) -> MeetingSnapshot {
        build_snapshot(self.events(), &self.machine)
    }

    pub fn timeline(&self) -> Vec<TimelineItem> {
        build_event_timeline(self.events())
    }

    pub fn metrics(&self) -> EventMetrics {
        build_event_metrics(self.events())
    }

    pub fn stats(&self) -> EventStats {
        EventStats::from(self.metrics())
    }

    pub fn replay_index(&self) -> i64 {
        *self.replay_index.lock()
    }

    /// Move the replay cursor, clamped to `[-1, len - 1]`
    pub fn set_replay_index(&mut self, index: i64) -> i64 {
        let last = self.events().len() as i64 - 1;
        let clamped = index.clamp(-1, last);
        *self.replay_index.lock() = clamped;
        clamped
    }

    /// Snapshot of the log prefix ending at the replay cursor
    pub fn replay_snapshot(&self) -> MeetingSnapshot {
        let index = self.replay_index();
        let events = self.events();
        let prefix = if index < 0 {
            &events[..0]
        } else {
            &events[..(index as usize + 1).min(events.len())]
        };
        build_snapshot(prefix, &self.machine)
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }
}

impl std::fmt::Debug for MeetingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeetingEngine")
            .field("store", &self.store)
            .field("state", &self.state())
            .field("replay_index", &self.replay_index())
            .field("actor", &self.actor)
            .field("can_moderate", &self.can_moderate)
            .finish()
    }
}
