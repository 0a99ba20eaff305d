//! Participants and their persistence state

use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How durably a participant's part of a transaction has been recorded
///
/// The variant order is the protocol order: a participant entry only ever
/// moves forward, and once observed as `Persistent` it is never downgraded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PersistenceState {
    /// Nothing is known about the participant yet
    #[default]
    Unknown,
    /// The participant has been asked to take part
    Initiated,
    /// The participant executed its part
    Executed,
    /// The participant's part is durably recorded
    Persistent,
}

impl PersistenceState {
    /// Combine two observations of the same participant
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Initiated => "initiated",
            Self::Executed => "executed",
            Self::Persistent => "persistent",
        }
    }
}

impl fmt::Display for PersistenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node holding a stake in a transaction's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub identity: NodeId,
    pub state: PersistenceState,
}

impl Participant {
    pub fn new(identity: NodeId, state: PersistenceState) -> Self {
        Self { identity, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_total_order() {
        use PersistenceState::*;
        assert!(Unknown < Initiated);
        assert!(Initiated < Executed);
        assert!(Executed < Persistent);
    }

    #[test]
    fn test_merge_never_goes_back() {
        use PersistenceState::*;
        assert_eq!(Persistent.merge(Initiated), Persistent);
        assert_eq!(Initiated.merge(Executed), Executed);
        assert_eq!(Executed.merge(Executed), Executed);
    }
}
