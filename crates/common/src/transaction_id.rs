//! Transaction identifier
//!
//! A transaction is named by the node that originated it plus a sequence
//! number allocated by that node, which makes the key unique across the
//! cluster without any coordination.

use crate::NodeId;
use crate::error::{DescriptorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cluster-wide transaction identifier
///
/// Immutable once created. Ordered by originator, then sequence.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TransactionId {
    originator: NodeId,
    sequence: u64,
}

impl TransactionId {
    /// Create a transaction ID for a transaction started by `originator`
    pub const fn new(originator: NodeId, sequence: u64) -> Self {
        Self {
            originator,
            sequence,
        }
    }

    /// Node that started the transaction
    pub fn originator(&self) -> NodeId {
        self.originator
    }

    /// Sequence number allocated by the originator
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Parse from the `originator/sequence` form produced by `Display`
    pub fn parse(s: &str) -> Result<Self> {
        let (originator, sequence) = s
            .rsplit_once('/')
            .ok_or_else(|| DescriptorError::InvalidTransactionId(s.to_string()))?;

        let originator = NodeId::parse(originator)
            .map_err(|_| DescriptorError::InvalidTransactionId(s.to_string()))?;
        let sequence = sequence
            .parse()
            .map_err(|_| DescriptorError::InvalidTransactionId(s.to_string()))?;

        Ok(Self::new(originator, sequence))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.originator, self.sequence)
    }
}
