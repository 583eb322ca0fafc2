//! Meeting Engine
//!
//! An event-sourced core for meeting rooms: every change is an immutable
//! event in a bounded per-meeting log, and the lifecycle state, snapshot,
//! timeline and metrics are all recomputed by replaying that log.
//!
//! # Features
//!
//! - **Validated envelopes**: untrusted events are checked before they land
//! - **Four-state lifecycle**: idle, live, paused, ended (terminal)
//! - **Bounded log**: 200 events per meeting, oldest dropped first
//! - **Time travel**: replay any prefix of the log for a historical snapshot
//! - **Moderation policy**: which lifecycle actions a user may request
//!
//! # Modules
//!
//! - `types`: Events, payloads, actors, actions and derived views
//! - `protocol`: Protocol version, payload schemas and display labels
//! - `validation`: Envelope validation and structured errors
//! - `machine`: Lifecycle state machine
//! - `event_store`: Bounded, persisted, observable event log
//! - `policy`: Action availability rules
//! - `selectors`: Replay into state, snapshot, timeline and metrics
//! - `telemetry`: Validation counters
//! - `engine`: A user session tying the above together
//! - `utils`: Timestamps and atomic file writes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use meeting_engine::{ActionRequest, Actor, ActorRole, EventStoreConfig, MeetingEngine, MemoryStorage};
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut engine = MeetingEngine::open("mtg-1001", storage, &EventStoreConfig::default())
//!     .with_actor(Actor::new("王主持", ActorRole::Host));
//!
//! let outcome = engine.request_action("start", ActionRequest::default());
//! assert!(outcome.ok);
//! println!("{}", engine.state_label());
//! ```

pub mod engine;
pub mod event_store;
pub mod machine;
pub mod policy;
pub mod protocol;
pub mod selectors;
pub mod telemetry;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use engine::{ActionOutcome, ActionRequest, MeetingEngine};
pub use event_store::{
    EventStoreConfig, FileStorage, KeyValueStorage, MeetingEventStore, MemoryStorage, Subscription,
};
pub use machine::{MachineEvent, MeetingMachine, MeetingState};
pub use policy::{get_action_availability, PolicyContext};
pub use selectors::{build_event_metrics, build_event_timeline, build_snapshot, get_state_from_events};
pub use telemetry::{TelemetrySnapshot, ValidationTelemetry};
pub use types::{
    ActionKey, Actor, ActorRole, Event, EventMetrics, EventPayload, EventStats, EventType,
    MeetingAction, MeetingSnapshot, PayloadMap, TimelineItem,
};
pub use validation::{validate, EngineError, ErrorCode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
