//! Persistence log trait and record types
//!
//! Volatile participants hand every persistence confirmation they receive to
//! a durable log. The log is the long-term record of which participants of
//! a transaction are known to be persistent, used for recovery and cleanup.

use proven_common::TransactionDescriptor;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors reported by log backends
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("Log is closed")]
    Closed,

    #[error("Record encoding failed: {0}")]
    Codec(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Trait for persistence log backends
///
/// Appends are synchronous; callers run them inline while processing a
/// message and never wait on anything else.
pub trait PersistenceLog: Send + Sync {
    /// Record a persistence confirmation for the descriptor's transaction
    fn append_persistence_record(&self, descriptor: &TransactionDescriptor)
    -> Result<(), LogError>;
}

/// One appended log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceRecord {
    /// Descriptor as it was received
    pub descriptor: TransactionDescriptor,
    /// System time of the append (ms since epoch)
    pub appended_at_ms: u64,
}

impl PersistenceRecord {
    /// Create a record stamped with the current time
    pub fn new(descriptor: TransactionDescriptor) -> Self {
        let appended_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            descriptor,
            appended_at_ms,
        }
    }

    /// Serialize to bytes for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>, LogError> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(self, &mut bytes)
            .map_err(|e| LogError::Codec(format!("Failed to serialize record: {}", e)))?;
        Ok(bytes)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LogError> {
        ciborium::de::from_reader(bytes)
            .map_err(|e| LogError::Codec(format!("Failed to deserialize record: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proven_common::{NodeId, Participant, PersistenceState, TransactionId};

    #[test]
    fn test_record_encoding() {
        let node = NodeId::new(0x72, 1);
        let descriptor = TransactionDescriptor::new(
            TransactionId::new(node, 3),
            vec![Participant::new(node, PersistenceState::Persistent)],
        )
        .unwrap();

        let record = PersistenceRecord::new(descriptor);
        assert!(record.appended_at_ms > 0);

        let bytes = record.to_bytes().unwrap();
        assert_eq!(PersistenceRecord::from_bytes(&bytes).unwrap(), record);
    }

    #[test]
    fn test_truncated_record_rejected() {
        let record = PersistenceRecord::new(TransactionDescriptor::empty());
        let bytes = record.to_bytes().unwrap();

        assert!(matches!(
            PersistenceRecord::from_bytes(&bytes[..bytes.len() / 2]),
            Err(LogError::Codec(_))
        ));
    }
}
