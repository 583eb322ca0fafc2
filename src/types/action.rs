//! Lifecycle actions a moderator can request

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::event::EventType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKey {
    Start,
    Pause,
    Resume,
    End,
}

impl ActionKey {
    pub const ALL: [ActionKey; 4] = [
        ActionKey::Start,
        ActionKey::Pause,
        ActionKey::Resume,
        ActionKey::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKey::Start => "start",
            ActionKey::Pause => "pause",
            ActionKey::Resume => "resume",
            ActionKey::End => "end",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKey::Start => "开始会议",
            ActionKey::Pause => "暂停会议",
            ActionKey::Resume => "继续会议",
            ActionKey::End => "结束会议",
        }
    }

    /// The lifecycle event recorded when this action goes through
    pub fn event_type(&self) -> EventType {
        match self {
            ActionKey::Start => EventType::MeetingStarted,
            ActionKey::Pause => EventType::MeetingPaused,
            ActionKey::Resume => EventType::MeetingResumed,
            ActionKey::End => EventType::MeetingEnded,
        }
    }
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for ActionKey {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Availability of one action; `reason` is empty when enabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingAction {
    pub key: ActionKey,
    pub label: String,
    pub enabled: bool,
    pub reason: String,
}

impl MeetingAction {
    pub fn new(key: ActionKey, enabled: bool, reason: &str) -> Self {
        Self {
            key,
            label: key.label().to_string(),
            enabled,
            reason: if enabled { String::new() } else { reason.to_string() },
        }
    }
}
