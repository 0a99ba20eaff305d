//! Deployment role of a participant service

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a service does with persistence notifications
///
/// A deployment is exactly one of the two; the role is fixed when the
/// service starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Reports its own durability eagerly once it executed its part
    PersistentParticipant,
    /// Records persistence notices it receives into the durable log
    VolatileParticipant,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "persistent_participant" => Some(Self::PersistentParticipant),
            "volatile_participant" => Some(Self::VolatileParticipant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersistentParticipant => "persistent_participant",
            Self::VolatileParticipant => "volatile_participant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
