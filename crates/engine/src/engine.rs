//! Core mock engine implementation
//!
//! This module provides the central mock engine: the registry of message
//! types and the table of node endpoints that sessions deliver into.

use crate::{Message, MessageType, MockEngineError, Result};
use parking_lot::Mutex;
use proven_common::NodeId;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Default time a posted message waits for its reply
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Sender half of a node's inbound queue
pub(crate) type Inbound = mpsc::UnboundedSender<Delivery>;

/// A message delivered to a node together with the way back to the sender
#[derive(Debug)]
pub struct Delivery {
    /// Node that posted the message
    pub source: NodeId,

    /// The delivered message
    pub message: Message,

    /// Handle for answering the message
    pub reply: ReplyHandle,
}

/// One-shot reply path for a delivered message
#[derive(Debug)]
pub struct ReplyHandle {
    tx: oneshot::Sender<Message>,
}

impl ReplyHandle {
    pub(crate) fn new(tx: oneshot::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Send the reply back to the poster
    ///
    /// The reply is handed over as-is; checking that it belongs to the
    /// right reply type is the poster's business.
    pub fn send(self, reply: Message) -> Result<()> {
        self.tx
            .send(reply)
            .map_err(|_| MockEngineError::ChannelClosed)
    }
}

/// Inbound message stream of one node
pub struct Endpoint {
    node_id: NodeId,
    receiver: mpsc::UnboundedReceiver<Delivery>,
}

impl Endpoint {
    /// Node this endpoint belongs to
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Receive the next delivery
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.receiver.recv().await
    }

    /// Try to receive without blocking
    pub fn try_recv(&mut self) -> Option<Delivery> {
        self.receiver.try_recv().ok()
    }
}

impl futures::Stream for Endpoint {
    type Item = Delivery;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Mock engine that simulates the production transport
pub struct MockEngine {
    /// Registered message types by opcode
    message_types: Arc<Mutex<HashMap<u32, MessageType>>>,

    /// Inbound queues of every node with a registered endpoint
    endpoints: Arc<Mutex<HashMap<NodeId, Inbound>>>,

    /// How long a posted message waits for its reply
    reply_timeout: Duration,
}

impl MockEngine {
    /// Create a new mock engine
    pub fn new() -> Self {
        Self {
            message_types: Arc::new(Mutex::new(HashMap::new())),
            endpoints: Arc::new(Mutex::new(HashMap::new())),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Set how long posted messages wait for their reply
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    /// Register a message type
    ///
    /// Registering the same type again is a no-op; reusing an opcode for a
    /// different type is rejected.
    pub fn register_message_type(&self, message_type: MessageType) -> Result<()> {
        let mut types = self.message_types.lock();
        match types.get(&message_type.opcode) {
            Some(existing) if *existing == message_type => Ok(()),
            Some(existing) => Err(MockEngineError::InvalidOperation(format!(
                "opcode {} already registered as {}",
                message_type.opcode, existing.name
            ))),
            None => {
                types.insert(message_type.opcode, message_type);
                Ok(())
            }
        }
    }

    /// Look up a registered message type
    pub fn message_type(&self, opcode: u32) -> Option<MessageType> {
        self.message_types.lock().get(&opcode).copied()
    }

    /// Register the inbound endpoint of a node
    ///
    /// A node has at most one endpoint; registering again replaces the
    /// previous one, whose stream then ends.
    pub fn register_endpoint(&self, node_id: NodeId) -> Endpoint {
        let (tx, rx) = mpsc::unbounded_channel();
        self.endpoints.lock().insert(node_id, tx);

        Endpoint {
            node_id,
            receiver: rx,
        }
    }

    /// Drop a node's endpoint so that further sends to it fail
    pub fn disconnect(&self, node_id: NodeId) {
        self.endpoints.lock().remove(&node_id);
    }

    /// Check whether a node has a live endpoint
    pub fn is_connected(&self, node_id: NodeId) -> bool {
        self.endpoints
            .lock()
            .get(&node_id)
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Inbound queue of a node
    pub(crate) fn inbound(&self, node_id: NodeId) -> Result<Inbound> {
        self.endpoints
            .lock()
            .get(&node_id)
            .cloned()
            .ok_or(MockEngineError::EndpointNotFound(node_id))
    }

    /// Clean up endpoints whose receiver is gone
    pub fn cleanup(&self) {
        self.endpoints.lock().retain(|_, tx| !tx.is_closed());
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}
