//! In-memory mock engine for testing the transaction manager
//!
//! This module provides an in-memory implementation of the production
//! transport API: a message-type registry, per-node endpoints, session
//! resolution and fire-and-forget posting with reply observers.

use proven_common::NodeId;
use thiserror::Error;

pub mod client;
pub mod engine;
pub mod message;

pub use client::{MockClient, Session};
pub use engine::{Delivery, Endpoint, MockEngine, ReplyHandle};
pub use message::{Message, MessageType};

/// Mock engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockEngineError {
    #[error("No endpoint registered for node: {0}")]
    EndpointNotFound(NodeId),

    #[error("Endpoint closed for node: {0}")]
    EndpointClosed(NodeId),

    #[error("Unknown message type: opcode {0}")]
    UnknownMessageType(u32),

    #[error("Operation timed out")]
    Timeout,

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, MockEngineError>;
