//! Participant service instance

use crate::config::DtmConfig;
use crate::error::{DtmError, Result};
use crate::locality::LocalityAssigner;
use crate::notifier::Notifier;
use crate::role::Role;
use proven_common::{NodeId, TransactionDescriptor};
use proven_engine::MockClient;
use proven_log::PersistenceLog;
use std::sync::Arc;

/// One persistence participant service
///
/// Holds the read-only configuration together with the collaborators its
/// tasks use: the notifier, the durable log and the locality pool.
pub struct DtmService {
    config: DtmConfig,
    notifier: Notifier,
    log: Arc<dyn PersistenceLog>,
    localities: LocalityAssigner,
}

impl DtmService {
    /// Create a service
    ///
    /// The client must belong to the configured identity.
    pub fn new(config: DtmConfig, client: MockClient, log: Arc<dyn PersistenceLog>) -> Result<Self> {
        let count = config.locality_count()?;
        if client.node_id() != config.identity {
            return Err(DtmError::Config(format!(
                "client node {} does not match identity {}",
                client.node_id(),
                config.identity
            )));
        }

        tracing::info!(
            "Starting {} service {} with {} localities",
            config.role,
            config.identity,
            count
        );

        Ok(Self {
            config,
            notifier: Notifier::new(client),
            log,
            localities: LocalityAssigner::new(count),
        })
    }

    pub fn identity(&self) -> NodeId {
        self.config.identity
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn config(&self) -> &DtmConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn log(&self) -> &dyn PersistenceLog {
        self.log.as_ref()
    }

    pub fn localities(&self) -> &LocalityAssigner {
        &self.localities
    }

    /// Node that receives the `Persistent` acknowledgement for a descriptor
    pub fn ack_target(&self, descriptor: &TransactionDescriptor) -> NodeId {
        self.config.ack_target.resolve(descriptor)
    }
}
