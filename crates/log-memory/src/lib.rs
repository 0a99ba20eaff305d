//! In-memory persistence log implementation
//!
//! Records are kept encoded, exactly as a storage-backed log would write
//! them, next to a merged view per transaction. The merged view holds, for
//! every participant ever recorded, the highest state seen in any record.

use parking_lot::Mutex;
use proven_common::{Participant, PersistenceState, TransactionDescriptor, TransactionId};
use proven_log::{LogError, PersistenceLog, PersistenceRecord};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};

#[derive(Default)]
struct LogEntry {
    /// Encoded records in append order
    records: Vec<Vec<u8>>,
    /// Max-merged participant states over all records
    merged: TransactionDescriptor,
}

#[derive(Default)]
struct LogState {
    entries: HashMap<TransactionId, LogEntry>,
    subscribers: Vec<mpsc::UnboundedSender<TransactionDescriptor>>,
    total: usize,
    closed: bool,
}

/// In-memory persistence log for testing
#[derive(Default)]
pub struct MemoryLog {
    state: Mutex<LogState>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded records appended for a transaction, oldest first
    pub fn records(&self, txn: TransactionId) -> Vec<PersistenceRecord> {
        let state = self.state.lock();
        state
            .entries
            .get(&txn)
            .map(|entry| {
                entry
                    .records
                    .iter()
                    .filter_map(|bytes| PersistenceRecord::from_bytes(bytes).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Merged view of a transaction
    pub fn merged(&self, txn: TransactionId) -> Option<TransactionDescriptor> {
        self.state
            .lock()
            .entries
            .get(&txn)
            .map(|entry| entry.merged.clone())
    }

    /// Whether every participant of the transaction is recorded as persistent
    pub fn is_all_persistent(&self, txn: TransactionId) -> bool {
        self.merged(txn)
            .is_some_and(|merged| merged.all_in_state(PersistenceState::Persistent))
    }

    /// Total number of records appended
    pub fn len(&self) -> usize {
        self.state.lock().total
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to appended descriptors
    ///
    /// Every successful append after this call is delivered to the returned
    /// receiver. Dropped receivers are pruned on the next append.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TransactionDescriptor> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().subscribers.push(tx);
        rx
    }

    /// Close the log; further appends fail with `LogError::Closed`
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.subscribers.clear();
    }
}

/// Fold `incoming` into `merged`, keeping the max state per participant
fn merge_into(
    merged: &TransactionDescriptor,
    incoming: &TransactionDescriptor,
) -> Result<TransactionDescriptor, LogError> {
    if merged.is_empty() {
        return Ok(incoming.clone());
    }

    let mut participants: Vec<Participant> = merged.participants().to_vec();
    for participant in incoming.participants() {
        match participants
            .iter_mut()
            .find(|p| p.identity == participant.identity)
        {
            Some(existing) => existing.state = existing.state.merge(participant.state),
            None => participants.push(*participant),
        }
    }

    TransactionDescriptor::new(merged.id(), participants)
        .map_err(|e| LogError::Storage(e.to_string()))
}

impl PersistenceLog for MemoryLog {
    fn append_persistence_record(
        &self,
        descriptor: &TransactionDescriptor,
    ) -> Result<(), LogError> {
        let bytes = PersistenceRecord::new(descriptor.clone()).to_bytes()?;

        let mut state = self.state.lock();
        if state.closed {
            return Err(LogError::Closed);
        }

        let entry = state.entries.entry(descriptor.id()).or_default();
        entry.merged = merge_into(&entry.merged, descriptor)?;
        entry.records.push(bytes);
        let all_persistent = entry.merged.all_in_state(PersistenceState::Persistent);
        state.total += 1;

        state
            .subscribers
            .retain(|tx| tx.send(descriptor.clone()).is_ok());

        debug!(
            "Appended persistence record for {} (all persistent: {})",
            descriptor.id(),
            all_persistent
        );
        trace!("{:?}", descriptor.participants());

        Ok(())
    }
}
