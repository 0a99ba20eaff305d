//! Mock client that follows the production transport client API
//!
//! A client belongs to one node. It resolves sessions to other nodes and
//! posts messages over them, either fire-and-forget with a reply observer
//! or as an awaited request.

use crate::engine::{Delivery, Inbound, MockEngine, ReplyHandle};
use crate::{Message, MockEngineError, Result};
use proven_common::NodeId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Communication session with one target node
#[derive(Clone)]
pub struct Session {
    target: NodeId,
    inbound: Inbound,
}

impl Session {
    /// Node this session talks to
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Whether the target's endpoint is still there
    pub fn is_connected(&self) -> bool {
        !self.inbound.is_closed()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("target", &self.target)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Mock client for interacting with the mock engine
#[derive(Clone)]
pub struct MockClient {
    /// Node ID
    node_id: NodeId,

    /// Reference to the mock engine
    engine: Arc<MockEngine>,
}

impl MockClient {
    /// Create a new mock client
    pub fn new(node_id: NodeId, engine: Arc<MockEngine>) -> Self {
        Self { node_id, engine }
    }

    /// Get the node ID of this client
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Get the engine this client talks through
    pub fn engine(&self) -> &Arc<MockEngine> {
        &self.engine
    }

    /// Resolve a session to a target node
    pub fn session(&self, target: NodeId) -> Result<Session> {
        let inbound = self.engine.inbound(target)?;
        Ok(Session { target, inbound })
    }

    /// Post a message without waiting for its reply
    ///
    /// Submission is synchronous: once this returns `Ok` the message sits in
    /// the target's queue. `on_reply` runs on a spawned task when the reply
    /// arrives, or with an error once the exchange can no longer complete
    /// (the target dropped the reply handle or the reply timeout elapsed).
    pub fn post<F>(&self, session: &Session, message: Message, on_reply: F) -> Result<()>
    where
        F: FnOnce(Result<Message>) + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| MockEngineError::InvalidOperation("post outside of a runtime".into()))?;

        let reply_rx = self.submit(session, message)?;
        let timeout = self.engine.reply_timeout();

        runtime.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, reply_rx).await {
                Ok(Ok(reply)) => Ok(reply),
                Ok(Err(_)) => Err(MockEngineError::ChannelClosed),
                Err(_) => Err(MockEngineError::Timeout),
            };
            on_reply(outcome);
        });

        Ok(())
    }

    /// Send a request and wait for a reply
    pub async fn request(
        &self,
        session: &Session,
        message: Message,
        timeout_ms: u64,
    ) -> Result<Message> {
        let reply_rx = self.submit(session, message)?;

        match tokio::time::timeout(Duration::from_millis(timeout_ms), reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(MockEngineError::ChannelClosed),
            Err(_) => Err(MockEngineError::Timeout),
        }
    }

    /// Validate the message type and hand the message to the target queue
    fn submit(&self, session: &Session, message: Message) -> Result<oneshot::Receiver<Message>> {
        let message_type = self
            .engine
            .message_type(message.opcode)
            .ok_or(MockEngineError::UnknownMessageType(message.opcode))?;

        if message_type.is_reply {
            return Err(MockEngineError::InvalidOperation(format!(
                "{} is a reply type and cannot be posted",
                message_type.name
            )));
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let delivery = Delivery {
            source: self.node_id,
            message,
            reply: ReplyHandle::new(reply_tx),
        };

        session
            .inbound
            .send(delivery)
            .map_err(|_| MockEngineError::EndpointClosed(session.target))?;

        tracing::trace!(
            "{} {} -> {}",
            message_type.name,
            self.node_id,
            session.target
        );

        Ok(reply_rx)
    }
}
