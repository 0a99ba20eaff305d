//! Recording and relaying persistence confirmations
//!
//! Only the originator of the transaction is told; the other participants
//! are not notified from here. The local upgrade also stays on the working
//! copy and is not written back to the durable log.

use crate::error::{DtmError, Result};
use crate::registry::ServiceRegistry;
use crate::service::DtmService;
use proven_common::{PersistenceState, TransactionDescriptor};
use proven_protocol::MessageKind;

/// Mark the local service persistent and relay the descriptor to its originator
///
/// The local service is looked up in `registry`; a process without one
/// reports `DtmError::ServiceNotFound`.
pub fn on_persistent(registry: &ServiceRegistry, descriptor: &TransactionDescriptor) -> Result<()> {
    let service = registry
        .find_local_service()
        .ok_or(DtmError::ServiceNotFound(registry.local()))?;
    service.on_persistent(descriptor)
}

impl DtmService {
    /// Mark this service persistent and relay the descriptor to its originator
    ///
    /// `descriptor` itself is never modified.
    pub fn on_persistent(&self, descriptor: &TransactionDescriptor) -> Result<()> {
        let mut working = descriptor.clone();
        let upgraded = working.merge_local_state(self.identity(), PersistenceState::Persistent);

        tracing::debug!(
            "Persistence confirmed for {} at {} (upgraded: {})",
            working.id(),
            self.identity(),
            upgraded
        );

        let sent = self
            .notifier()
            .notify(working.originator(), MessageKind::Persistent, &working);
        working.release();
        sent
    }
}
