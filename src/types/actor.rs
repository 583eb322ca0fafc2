//! Actor attribution for meeting events

use serde::{Deserialize, Serialize};

/// Display name used when an event carries no usable actor
pub const SYSTEM_ACTOR_NAME: &str = "系统";

/// Role of the entity that caused an event
///
/// Serialized as a plain lowercase string. Roles outside the known set are
/// kept verbatim so externally produced events survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActorRole {
    Host,
    Cohost,
    Participant,
    #[default]
    System,
    Other(String),
}

impl ActorRole {
    pub fn as_str(&self) -> &str {
        match self {
            ActorRole::Host => "host",
            ActorRole::Cohost => "cohost",
            ActorRole::Participant => "participant",
            ActorRole::System => "system",
            ActorRole::Other(role) => role,
        }
    }

    /// Hosts and co-hosts may invoke gated lifecycle actions
    pub fn is_moderator(&self) -> bool {
        matches!(self, ActorRole::Host | ActorRole::Cohost)
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<String> for ActorRole {
    fn from(role: String) -> Self {
        match role.as_str() {
            "host" => ActorRole::Host,
            "cohost" => ActorRole::Cohost,
            "participant" => ActorRole::Participant,
            "system" => ActorRole::System,
            _ => ActorRole::Other(role),
        }
    }
}

impl From<&str> for ActorRole {
    fn from(role: &str) -> Self {
        ActorRole::from(role.to_string())
    }
}

impl From<ActorRole> for String {
    fn from(role: ActorRole) -> Self {
        match role {
            ActorRole::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The named entity an event is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: impl Into<ActorRole>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }

    pub fn system() -> Self {
        Self::new(SYSTEM_ACTOR_NAME, ActorRole::System)
    }

    /// Fill an empty name or role with the system defaults
    pub fn or_system_defaults(self) -> Self {
        let name = if self.name.is_empty() {
            SYSTEM_ACTOR_NAME.to_string()
        } else {
            self.name
        };
        let role = if self.role.is_empty() {
            ActorRole::System
        } else {
            self.role
        };
        Self { name, role }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}
