//! Typed request messages exchanged between participants

use crate::DTM_REQUEST_OPCODE;
use proven_common::TransactionDescriptor;
use proven_engine::Message;
use std::collections::HashMap;
use std::fmt;

/// Kind of a persistence notification
///
/// Only `Execute` and `Persistent` trigger a reaction on the receiving
/// side; the other kinds are carried for the wider transaction protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Ask a participant to execute its part
    Execute,
    /// A participant executed its part
    Executed,
    /// A participant's part is durable
    Persistent,
    /// Replay of a logged transaction during recovery
    Redo,
}

impl MessageKind {
    /// Parse from string header value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "execute" => Some(Self::Execute),
            "executed" => Some(Self::Executed),
            "persistent" => Some(Self::Persistent),
            "redo" => Some(Self::Redo),
            _ => None,
        }
    }

    /// Convert to string header value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Execute => "execute",
            Self::Executed => "executed",
            Self::Persistent => "persistent",
            Self::Redo => "redo",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence notification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtmRequest {
    /// What the sender is telling the receiver
    pub kind: MessageKind,
    /// The transaction it is about
    pub descriptor: TransactionDescriptor,
}

impl DtmRequest {
    pub fn new(kind: MessageKind, descriptor: TransactionDescriptor) -> Self {
        Self { kind, descriptor }
    }

    /// Parse a Message into a typed request
    pub fn from_message(msg: Message) -> Result<Self, ParseError> {
        if msg.opcode != DTM_REQUEST_OPCODE {
            return Err(ParseError::UnexpectedOpcode {
                expected: DTM_REQUEST_OPCODE,
                actual: msg.opcode,
            });
        }

        let kind_str = msg
            .get_header("dtm_msg")
            .ok_or(ParseError::MissingHeader("dtm_msg"))?;
        let kind = MessageKind::parse(kind_str)
            .ok_or_else(|| ParseError::InvalidKind(kind_str.to_string()))?;

        let descriptor = serde_json::from_slice(&msg.body)?;

        Ok(Self { kind, descriptor })
    }

    /// Convert to a raw Message for sending
    pub fn into_message(self) -> Result<Message, ParseError> {
        let body = serde_json::to_vec(&self.descriptor)?;

        let mut headers = HashMap::with_capacity(2);
        headers.insert("dtm_msg".to_string(), self.kind.as_str().to_string());
        headers.insert("txn_id".to_string(), self.descriptor.id().to_string());

        Ok(Message::new(DTM_REQUEST_OPCODE, body, headers))
    }
}

/// Errors that can occur when parsing messages
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid message kind: {0}")]
    InvalidKind(String),

    #[error("Invalid result code: {0}")]
    InvalidResultCode(String),

    #[error("Unexpected opcode {actual}, expected {expected}")]
    UnexpectedOpcode { expected: u32, actual: u32 },

    #[error("Invalid descriptor body: {0}")]
    Body(#[from] serde_json::Error),
}
