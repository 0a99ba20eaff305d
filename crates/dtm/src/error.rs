//! Error types for the persistence participant

use proven_common::NodeId;
use proven_engine::MockEngineError;
use proven_log::LogError;
use proven_protocol::{MessageKind, ParseError, ResultCode};
use thiserror::Error;

/// Result type for participant operations
pub type Result<T> = std::result::Result<T, DtmError>;

/// Participant errors
#[derive(Debug, Error)]
pub enum DtmError {
    #[error("Failed to create task: {0}")]
    TaskCreation(String),

    #[error("Failed to submit {kind} notice to {target}: {source}")]
    SendSubmission {
        kind: MessageKind,
        target: NodeId,
        source: MockEngineError,
    },

    #[error("Reply opcode {0} is not a persistence reply")]
    ReplyKindMismatch(u32),

    #[error("Log append failed: {0}")]
    LogAppend(#[from] LogError),

    #[error("No service registered for local node {0}")]
    ServiceNotFound(NodeId),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Message error: {0}")]
    Parse(#[from] ParseError),
}

impl DtmError {
    /// Result code reported to the sender of the message that failed
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::TaskCreation(_) | Self::Parse(_) | Self::Config(_) => ResultCode::EINVAL,
            Self::SendSubmission { .. } | Self::LogAppend(_) => ResultCode::EIO,
            Self::ReplyKindMismatch(_) => ResultCode::EPROTO,
            Self::ServiceNotFound(_) => ResultCode::EPERM,
        }
    }
}
