//! Transaction descriptor
//!
//! A descriptor names a transaction and carries the participant group with
//! each participant's persistence state. Descriptors are plain values:
//! cloning produces an independent copy, and every hop that needs to update
//! participant state works on its own clone rather than on a shared one.

use crate::error::{DescriptorError, Result};
use crate::{NodeId, Participant, PersistenceState, TransactionId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Transaction id plus participant group
///
/// Participant identities are unique within a descriptor. The order of the
/// participants is kept stable for the wire but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorRepr")]
pub struct TransactionDescriptor {
    id: TransactionId,
    participants: Vec<Participant>,
}

impl TransactionDescriptor {
    /// Create a descriptor, rejecting duplicate participant identities
    pub fn new(id: TransactionId, participants: Vec<Participant>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(participants.len());
        for participant in &participants {
            if !seen.insert(participant.identity) {
                return Err(DescriptorError::DuplicateParticipant(participant.identity));
            }
        }

        Ok(Self { id, participants })
    }

    /// The empty descriptor carried by replies
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the empty descriptor
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.id == TransactionId::default()
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Node that started the transaction
    pub fn originator(&self) -> NodeId {
        self.id.originator()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant by identity
    pub fn participant(&self, identity: NodeId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.identity == identity)
    }

    /// Check whether every participant has reached at least `state`
    pub fn all_in_state(&self, state: PersistenceState) -> bool {
        self.participants.iter().all(|p| p.state >= state)
    }

    /// Raise the state of `self_identity` to `new_state`
    ///
    /// The stored state becomes `max(current, new_state)`, so applying the
    /// same or an older state is a no-op. A descriptor that does not list
    /// `self_identity` is left untouched. Returns whether anything changed.
    pub fn merge_local_state(&mut self, self_identity: NodeId, new_state: PersistenceState) -> bool {
        match self
            .participants
            .iter_mut()
            .find(|p| p.identity == self_identity)
        {
            Some(participant) => {
                let merged = participant.state.merge(new_state);
                let changed = merged != participant.state;
                participant.state = merged;
                changed
            }
            None => false,
        }
    }

    /// Tear down the descriptor, freeing the participant storage
    ///
    /// Afterwards the descriptor is the empty descriptor.
    pub fn release(&mut self) {
        self.participants = Vec::new();
        self.id = TransactionId::default();
    }
}

/// Unchecked wire form, validated through `TransactionDescriptor::new`
#[derive(Deserialize)]
struct DescriptorRepr {
    id: TransactionId,
    participants: Vec<Participant>,
}

impl TryFrom<DescriptorRepr> for TransactionDescriptor {
    type Error = DescriptorError;

    fn try_from(repr: DescriptorRepr) -> Result<Self> {
        Self::new(repr.id, repr.participants)
    }
}
