//! Error types for descriptor construction

use crate::NodeId;
use thiserror::Error;

/// Result type for descriptor operations
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// Errors raised while building or parsing descriptor types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(NodeId),

    #[error("Invalid node ID: {0}")]
    InvalidNodeId(String),

    #[error("Invalid transaction ID: {0}")]
    InvalidTransactionId(String),
}
