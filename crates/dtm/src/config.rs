//! Participant service configuration

use crate::error::{DtmError, Result};
use crate::role::Role;
use proven_common::{NodeId, TransactionDescriptor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

const DEFAULT_LOCALITIES: usize = 4;

fn default_localities() -> usize {
    DEFAULT_LOCALITIES
}

/// Where a persistent participant sends its `Persistent` acknowledgement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckTarget {
    /// The originator of the transaction named by the descriptor
    #[default]
    Originator,
    /// A fixed node, whatever the transaction
    Fixed(NodeId),
}

impl AckTarget {
    /// Resolve the target node for a descriptor
    pub fn resolve(&self, descriptor: &TransactionDescriptor) -> NodeId {
        match self {
            Self::Originator => descriptor.originator(),
            Self::Fixed(node) => *node,
        }
    }
}

/// Configuration for a participant service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtmConfig {
    /// Identity of this service
    pub identity: NodeId,

    /// Deployment role
    pub role: Role,

    /// Target of `Persistent` acknowledgements
    #[serde(default)]
    pub ack_target: AckTarget,

    /// Number of localities tasks are spread over
    #[serde(default = "default_localities")]
    pub localities: usize,
}

impl DtmConfig {
    /// Create a new config with default acknowledgement target and localities
    pub fn new(identity: NodeId, role: Role) -> Self {
        Self {
            identity,
            role,
            ack_target: AckTarget::default(),
            localities: DEFAULT_LOCALITIES,
        }
    }

    /// Set the acknowledgement target
    pub fn with_ack_target(mut self, ack_target: AckTarget) -> Self {
        self.ack_target = ack_target;
        self
    }

    /// Set the number of localities
    pub fn with_localities(mut self, localities: usize) -> Self {
        self.localities = localities;
        self
    }

    /// Load and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DtmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.locality_count().map(|_| ())
    }

    /// Locality count as a non-zero value
    pub fn locality_count(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.localities)
            .ok_or_else(|| DtmError::Config("localities must be at least 1".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proven_common::{Participant, PersistenceState, TransactionId};

    #[test]
    fn test_defaults_from_json() {
        let config = DtmConfig::from_json(
            r#"{"identity": {"container": 114, "key": 2}, "role": "persistent_participant"}"#,
        )
        .unwrap();

        assert_eq!(
            config,
            DtmConfig::new(NodeId::new(0x72, 2), Role::PersistentParticipant)
        );
        assert_eq!(config.ack_target, AckTarget::Originator);
        assert_eq!(config.locality_count().unwrap().get(), 4);
    }

    #[test]
    fn test_fixed_ack_target_from_json() {
        let config = DtmConfig::from_json(
            r#"{
                "identity": {"container": 114, "key": 2},
                "role": "volatile_participant",
                "ack_target": {"fixed": {"container": 114, "key": 1}},
                "localities": 2
            }"#,
        )
        .unwrap();

        assert_eq!(config.ack_target, AckTarget::Fixed(NodeId::new(0x72, 1)));
        assert_eq!(config.localities, 2);
    }

    #[test]
    fn test_zero_localities_rejected() {
        let config = DtmConfig::new(NodeId::new(1, 1), Role::VolatileParticipant).with_localities(0);
        assert!(matches!(config.validate(), Err(DtmError::Config(_))));

        let json = r#"{"identity": {"container": 1, "key": 1}, "role": "volatile_participant", "localities": 0}"#;
        assert!(matches!(DtmConfig::from_json(json), Err(DtmError::Config(_))));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let json = r#"{"identity": {"container": 1, "key": 1}, "role": "observer"}"#;
        assert!(matches!(DtmConfig::from_json(json), Err(DtmError::Config(_))));
    }

    #[test]
    fn test_ack_target_resolution() {
        let originator = NodeId::new(0x72, 1);
        let descriptor = TransactionDescriptor::new(
            TransactionId::new(originator, 5),
            vec![Participant::new(originator, PersistenceState::Initiated)],
        )
        .unwrap();

        assert_eq!(AckTarget::Originator.resolve(&descriptor), originator);
        assert_eq!(
            AckTarget::Fixed(NodeId::new(9, 9)).resolve(&descriptor),
            NodeId::new(9, 9)
        );
    }
}
