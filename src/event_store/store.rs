//! Event Store - bounded, persisted, observable event log for one meeting
//!
//! The store is the single owner of a meeting's event cache and its
//! persisted mirror. It performs no internal locking of the log: every
//! mutation runs synchronously on the owner's thread.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::storage::{KeyValueStorage, StorageResult};
use super::subscribers::{Subscribers, Subscription};
use crate::types::Event;

/// Namespace prefix for persisted logs
pub const DEFAULT_STORAGE_PREFIX: &str = "easymeeting-meeting-events";

/// Events kept per meeting; older events are dropped first
pub const MAX_EVENT_COUNT: usize = 200;

/// Key segment used when no meeting id is set
const UNKNOWN_MEETING: &str = "unknown";

/// Configuration for the event store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStoreConfig {
    /// Prefix of the storage key (`<prefix>:<meetingId>`)
    pub storage_prefix: String,
    /// Capacity of each meeting's log
    pub max_events: usize,
    /// Directory for file-backed storage
    pub data_dir: PathBuf,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            max_events: MAX_EVENT_COUNT,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl EventStoreConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Read overrides from the environment
    ///
    /// - `MEETING_ENGINE_DATA_DIR`
    /// - `MEETING_ENGINE_STORAGE_PREFIX`
    /// - `MEETING_ENGINE_MAX_EVENTS` (positive integer)
    ///
    /// Missing or unusable values keep the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`EventStoreConfig::from_env`] over any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("MEETING_ENGINE_DATA_DIR").filter(|dir| !dir.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup("MEETING_ENGINE_STORAGE_PREFIX").filter(|p| !p.is_empty()) {
            config.storage_prefix = prefix;
        }
        if let Some(raw) = lookup("MEETING_ENGINE_MAX_EVENTS") {
            match raw.trim().parse::<usize>() {
                Ok(max) if max > 0 => config.max_events = max,
                _ => warn!(value = %raw, "ignoring invalid MEETING_ENGINE_MAX_EVENTS"),
            }
        }

        config
    }

    /// Storage key for a meeting
    pub fn storage_key(&self, meeting_id: Option<&str>) -> String {
        format!(
            "{}:{}",
            self.storage_prefix,
            meeting_id.unwrap_or(UNKNOWN_MEETING)
        )
    }
}

/// Append-only, capacity-bounded event log for one meeting
pub struct MeetingEventStore {
    meeting_id: Option<String>,
    storage_key: String,
    max_events: usize,
    storage: Arc<dyn KeyValueStorage>,
    cache: Vec<Event>,
    event_subscribers: Subscribers<Event>,
    list_subscribers: Subscribers<[Event]>,
    clear_subscribers: Subscribers<()>,
}

impl MeetingEventStore {
    /// Create a store for `meeting_id`
    ///
    /// Without a meeting id (or with an empty one) the store still works in
    /// memory but never reads or writes storage.
    pub fn new(
        meeting_id: Option<&str>,
        storage: Arc<dyn KeyValueStorage>,
        config: &EventStoreConfig,
    ) -> Self {
        let meeting_id = meeting_id.filter(|id| !id.is_empty()).map(str::to_string);
        Self {
            storage_key: config.storage_key(meeting_id.as_deref()),
            meeting_id,
            max_events: config.max_events.max(1),
            storage,
            cache: Vec::new(),
            event_subscribers: Subscribers::new(),
            list_subscribers: Subscribers::new(),
            clear_subscribers: Subscribers::new(),
        }
    }

    pub fn meeting_id(&self) -> Option<&str> {
        self.meeting_id.as_deref()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }

    /// Read the persisted log into the cache
    ///
    /// Fails soft: a missing, unreadable or corrupt log loads as empty, and
    /// individual malformed entries are skipped.
    pub fn load_events(&mut self) -> &[Event] {
        if self.meeting_id.is_none() {
            return &[];
        }

        self.cache = match self.storage.get(&self.storage_key) {
            Ok(Some(raw)) => parse_persisted_log(&raw, &self.storage_key),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %self.storage_key, error = %e, "failed to read event log");
                Vec::new()
            }
        };
        self.truncate();

        debug!(key = %self.storage_key, count = self.cache.len(), "loaded event log");
        &self.cache
    }

    /// Append an event, drop the oldest beyond capacity, persist and notify
    ///
    /// Per-event subscribers receive the appended event, list subscribers the
    /// whole retained log. Persistence failures are logged, not returned.
    pub fn append_event(&mut self, event: Event) -> &[Event] {
        let latest = event.clone();
        self.cache.push(event);
        let dropped = self.truncate();

        if let Err(e) = self.persist() {
            warn!(key = %self.storage_key, error = %e, "failed to persist event log");
        }

        debug!(
            key = %self.storage_key,
            event_type = %latest.event_type,
            count = self.cache.len(),
            dropped,
            "appended event"
        );

        self.event_subscribers.notify(&latest);
        self.list_subscribers.notify(self.cache.as_slice());
        &self.cache
    }

    /// Empty the log, remove the persisted copy and notify
    pub fn clear_events(&mut self) {
        self.cache.clear();

        if self.meeting_id.is_some() {
            if let Err(e) = self.storage.remove(&self.storage_key) {
                warn!(key = %self.storage_key, error = %e, "failed to remove event log");
            }
        }

        debug!(key = %self.storage_key, "cleared event log");

        self.clear_subscribers.notify(&());
        self.list_subscribers.notify(self.cache.as_slice());
    }

    /// Current in-memory log; never touches storage
    pub fn get_events(&self) -> &[Event] {
        &self.cache
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Be told about every appended event
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.event_subscribers.add(handler)
    }

    /// Be handed the whole log after every append or clear
    pub fn subscribe_events<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&[Event]) + Send + Sync + 'static,
    {
        self.list_subscribers.add(handler)
    }

    /// Be told when the log is cleared
    pub fn subscribe_clear<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.clear_subscribers.add(move |_: &()| handler())
    }

    pub fn subscriber_count(&self) -> usize {
        self.event_subscribers.len() + self.list_subscribers.len() + self.clear_subscribers.len()
    }

    /// Keep only the newest `max_events`; returns how many were dropped
    fn truncate(&mut self) -> usize {
        let overflow = self.cache.len().saturating_sub(self.max_events);
        if overflow > 0 {
            self.cache.drain(..overflow);
        }
        overflow
    }

    fn persist(&self) -> StorageResult<()> {
        if self.meeting_id.is_none() {
            return Ok(());
        }
        let json = serde_json::to_string(&self.cache)?;
        self.storage.set(&self.storage_key, &json)
    }
}

impl std::fmt::Debug for MeetingEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeetingEventStore")
            .field("storage_key", &self.storage_key)
            .field("max_events", &self.max_events)
            .field("len", &self.cache.len())
            .finish()
    }
}

fn parse_persisted_log(raw: &str, key: &str) -> Vec<Event> {
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!(key, "persisted event log is not an array; starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "persisted event log is corrupt; starting empty");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Event>(entry) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(key, index, error = %e, "skipping malformed persisted event");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::MemoryStorage;
    use crate::types::{EventType, PayloadMap};
    use parking_lot::Mutex;
    use serde_json::json;

    fn create_test_store(meeting_id: Option<&str>) -> (MeetingEventStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        let store = MeetingEventStore::new(
            meeting_id,
            Arc::new(storage.clone()),
            &EventStoreConfig::default(),
        );
        (store, storage)
    }

    fn event_at(event_type: EventType, timestamp: i64) -> Event {
        Event::with_timestamp(event_type, None, PayloadMap::new(), timestamp)
    }

    #[test]
    fn test_storage_key_format() {
        let (store, _) = create_test_store(Some("mtg-1001"));
        assert_eq!(store.storage_key(), "easymeeting-meeting-events:mtg-1001");

        let (store, _) = create_test_store(None);
        assert_eq!(store.storage_key(), "easymeeting-meeting-events:unknown");

        let (store, _) = create_test_store(Some(""));
        assert_eq!(store.meeting_id(), None);
    }

    #[test]
    fn test_append_persists_and_returns_cache() {
        let (mut store, storage) = create_test_store(Some("mtg-1001"));

        let event = event_at(EventType::MeetingStarted, 1);
        let events = store.append_event(event.clone());
        assert_eq!(events, &[event.clone()]);

        let raw = storage.get(store.storage_key()).unwrap().unwrap();
        let persisted: Vec<Event> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, vec![event]);
    }

    #[test]
    fn test_load_reads_what_another_store_wrote() {
        let (mut writer, storage) = create_test_store(Some("mtg-1001"));
        writer.append_event(event_at(EventType::MeetingStarted, 1));
        writer.append_event(event_at(EventType::MeetingLocked, 2));

        let mut reader = MeetingEventStore::new(
            Some("mtg-1001"),
            Arc::new(storage),
            &EventStoreConfig::default(),
        );
        assert!(reader.get_events().is_empty());

        let loaded = reader.load_events();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].event_type, EventType::MeetingLocked);
    }

    #[test]
    fn test_load_corrupt_log_is_empty() {
        let (mut store, storage) = create_test_store(Some("mtg-1001"));
        storage.set(store.storage_key(), "{not json").unwrap();
        assert!(store.load_events().is_empty());

        storage.set(store.storage_key(), "{\"a\":1}").unwrap();
        assert!(store.load_events().is_empty());
    }

    #[test]
    fn test_load_skips_malformed_entries() {
        let (mut store, storage) = create_test_store(Some("mtg-1001"));
        let good = event_at(EventType::MeetingStarted, 1);
        let raw = json!([good, {"type": "NOT_A_TYPE"}, 42]).to_string();
        storage.set(store.storage_key(), &raw).unwrap();

        assert_eq!(store.load_events(), &[good]);
    }

    #[test]
    fn test_store_without_meeting_id_never_touches_storage() {
        let (mut store, storage) = create_test_store(None);
        storage
            .set("easymeeting-meeting-events:unknown", "[]")
            .unwrap();

        store.append_event(event_at(EventType::MeetingStarted, 1));
        assert_eq!(store.len(), 1);
        assert_eq!(
            storage.get("easymeeting-meeting-events:unknown").unwrap(),
            Some("[]".to_string())
        );
        assert!(store.load_events().is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest_first() {
        let (mut store, _) = create_test_store(Some("mtg-1001"));
        for i in 0..(MAX_EVENT_COUNT as i64 + 5) {
            store.append_event(event_at(EventType::HandRaised, i));
        }

        let events = store.get_events();
        assert_eq!(events.len(), MAX_EVENT_COUNT);
        assert_eq!(events[0].timestamp, 5);
        assert_eq!(events[MAX_EVENT_COUNT - 1].timestamp, MAX_EVENT_COUNT as i64 + 4);
    }

    #[test]
    fn test_subscribers_are_notified_after_registration_only() {
        let (mut store, _) = create_test_store(Some("mtg-1001"));
        store.append_event(event_at(EventType::MeetingStarted, 1));

        let seen_events = Arc::new(Mutex::new(Vec::new()));
        let seen_lists = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen_events);
        let _event_sub = store.subscribe(move |event| sink.lock().push(event.timestamp));
        let sink = Arc::clone(&seen_lists);
        let _list_sub = store.subscribe_events(move |events| sink.lock().push(events.len()));

        assert!(seen_events.lock().is_empty());
        assert!(seen_lists.lock().is_empty());

        store.append_event(event_at(EventType::MeetingPaused, 2));

        assert_eq!(*seen_events.lock(), vec![2]);
        assert_eq!(*seen_lists.lock(), vec![2]);
    }

    #[test]
    fn test_clear_notifies_and_removes_persisted_log() {
        let (mut store, storage) = create_test_store(Some("mtg-1001"));
        store.append_event(event_at(EventType::MeetingStarted, 1));

        let cleared = Arc::new(Mutex::new(0));
        let lists = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&cleared);
        let _clear_sub = store.subscribe_clear(move || *sink.lock() += 1);
        let sink = Arc::clone(&lists);
        let _list_sub = store.subscribe_events(move |events| sink.lock().push(events.len()));

        store.clear_events();

        assert!(store.is_empty());
        assert!(!storage.contains_key(store.storage_key()));
        assert_eq!(*cleared.lock(), 1);
        assert_eq!(*lists.lock(), vec![0]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let (mut store, _) = create_test_store(Some("mtg-1001"));
        let calls = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&calls);
        let subscription = store.subscribe(move |_| *sink.lock() += 1);

        store.append_event(event_at(EventType::MeetingStarted, 1));
        subscription.unsubscribe();
        store.append_event(event_at(EventType::MeetingPaused, 2));

        assert_eq!(*calls.lock(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_config_storage_key() {
        let config = EventStoreConfig {
            storage_prefix: "custom".to_string(),
            ..Default::default()
        };
        assert_eq!(config.storage_key(Some("abc")), "custom:abc");
        assert_eq!(config.storage_key(None), "custom:unknown");
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_config_from_lookup_overrides_defaults() {
        let config = EventStoreConfig::from_lookup(lookup(&[
            ("MEETING_ENGINE_DATA_DIR", "/var/lib/meetings"),
            ("MEETING_ENGINE_STORAGE_PREFIX", "staging-events"),
            ("MEETING_ENGINE_MAX_EVENTS", "50"),
        ]));

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/meetings"));
        assert_eq!(config.storage_prefix, "staging-events");
        assert_eq!(config.max_events, 50);
    }

    #[test]
    fn test_config_from_lookup_without_vars_is_default() {
        assert_eq!(
            EventStoreConfig::from_lookup(|_| None),
            EventStoreConfig::default()
        );
    }

    #[test]
    fn test_config_unusable_values_keep_defaults() {
        for raw in ["", "0", "-5", "many", "12.5"] {
            let config = EventStoreConfig::from_lookup(lookup(&[
                ("MEETING_ENGINE_DATA_DIR", ""),
                ("MEETING_ENGINE_STORAGE_PREFIX", ""),
                ("MEETING_ENGINE_MAX_EVENTS", raw),
            ]));
            assert_eq!(config, EventStoreConfig::default(), "MAX_EVENTS={:?}", raw);
            assert_eq!(config.max_events, MAX_EVENT_COUNT);
        }
    }

    #[test]
    fn test_config_from_env_reads_process_environment() {
        env::set_var("MEETING_ENGINE_STORAGE_PREFIX", "env-events");
        env::set_var("MEETING_ENGINE_MAX_EVENTS", "0");
        let config = EventStoreConfig::from_env();
        env::remove_var("MEETING_ENGINE_STORAGE_PREFIX");
        env::remove_var("MEETING_ENGINE_MAX_EVENTS");

        assert_eq!(config.storage_prefix, "env-events");
        assert_eq!(config.max_events, MAX_EVENT_COUNT);
    }
}
