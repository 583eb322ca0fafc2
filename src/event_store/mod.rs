//! Event Store Module
//!
//! Per-meeting persistence and fan-out of the event log:
//! - `MeetingEventStore`: bounded append-only log with subscriptions
//! - `KeyValueStorage`: string-keyed backend the log is mirrored into
//! - `MemoryStorage` / `FileStorage`: the two provided backends
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────┐    ┌──────────────┐    ┌─────────────┐    ┌─────────────────┐
//! │ validated│───►│ push + drop  │───►│ persist as  │───►│ notify event,   │
//! │ event    │    │ oldest > 200 │    │ JSON array  │    │ then list subs  │
//! └──────────┘    └──────────────┘    └─────────────┘    └─────────────────┘
//!
//! Read Path (Startup):
//! ┌──────────────────┐    ┌────────────────────┐
//! │ load_events()    │───►│ replay in selectors│───► Ready!
//! │ skip bad entries │    │ (state, snapshot)  │
//! └──────────────────┘    └────────────────────┘
//! ```

mod storage;
mod store;
mod subscribers;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError, StorageResult};
pub use store::{EventStoreConfig, MeetingEventStore, DEFAULT_STORAGE_PREFIX, MAX_EVENT_COUNT};
pub use subscribers::Subscription;
