//! Outbound persistence notices
//!
//! Notices are fire-and-forget: `notify` returns as soon as the transport
//! accepted the message. Replies are looked at later by an observer running
//! on the transport's reply path, never by the caller.

use crate::error::{DtmError, Result};
use proven_common::{NodeId, TransactionDescriptor};
use proven_engine::{Message, MockClient};
use proven_protocol::{DtmReply, DtmRequest, MessageKind, is_reply_opcode};

/// Sends persistence notices on behalf of one service
#[derive(Clone)]
pub struct Notifier {
    client: MockClient,
}

impl Notifier {
    pub fn new(client: MockClient) -> Self {
        Self { client }
    }

    /// Node the notices are sent from
    pub fn node_id(&self) -> NodeId {
        self.client.node_id()
    }

    /// Send a notice carrying a copy of `descriptor` to `target`
    ///
    /// Submission failures are returned as `DtmError::SendSubmission`; they
    /// are never retried here.
    pub fn notify(
        &self,
        target: NodeId,
        kind: MessageKind,
        descriptor: &TransactionDescriptor,
    ) -> Result<()> {
        let message = DtmRequest::new(kind, descriptor.clone()).into_message()?;
        let source = self.client.node_id();

        let submitted = self.client.session(target).and_then(|session| {
            self.client.post(&session, message, move |outcome| {
                on_reply(source, target, kind, outcome)
            })
        });

        if let Err(e) = submitted {
            tracing::error!(
                "Failed to submit {} notice {} -> {} for {}: {}",
                kind,
                source,
                target,
                descriptor.id(),
                e
            );
            return Err(DtmError::SendSubmission {
                kind,
                target,
                source: e,
            });
        }

        tracing::debug!(
            "Sent {} notice {} -> {} for {}",
            kind,
            source,
            target,
            descriptor.id()
        );
        Ok(())
    }
}

/// Check the outcome of a notice exchange
///
/// A reply must belong to the persistence reply family. Transport failures
/// of the exchange yield `Ok(None)`.
pub fn observe_reply(outcome: proven_engine::Result<Message>) -> Result<Option<DtmReply>> {
    match outcome {
        Ok(message) => {
            if !is_reply_opcode(message.opcode) {
                return Err(DtmError::ReplyKindMismatch(message.opcode));
            }
            Ok(Some(DtmReply::from_message(message)?))
        }
        Err(_) => Ok(None),
    }
}

/// Reply observer installed for every notice
///
/// A reply from outside the reply family means the transport or the peer
/// broke the protocol. That is not recoverable and panics the observer.
fn on_reply(
    source: NodeId,
    target: NodeId,
    kind: MessageKind,
    outcome: proven_engine::Result<Message>,
) {
    if let Err(e) = &outcome {
        tracing::warn!("{} notice {} -> {} got no reply: {}", kind, source, target, e);
    }

    match observe_reply(outcome) {
        Ok(Some(reply)) if !reply.result.is_ok() => {
            tracing::warn!(
                "{} notice {} -> {} failed with {}",
                kind,
                source,
                target,
                reply.result
            );
        }
        Ok(_) => {}
        Err(e @ DtmError::ReplyKindMismatch(_)) => {
            tracing::error!("{} notice {} -> {}: {}", kind, source, target, e);
            panic!("{} notice {} -> {}: {}", kind, source, target, e);
        }
        Err(e) => {
            tracing::warn!("Unreadable reply to {} notice {} -> {}: {}", kind, source, target, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proven_common::{Participant, PersistenceState, TransactionId};
    use proven_engine::{MockEngine, MockEngineError};
    use proven_protocol::{DTM_REQUEST_OPCODE, ResultCode, register_message_types};
    use std::sync::Arc;

    const SOURCE: NodeId = NodeId::new(0x72, 2);
    const TARGET: NodeId = NodeId::new(0x72, 1);

    fn descriptor() -> TransactionDescriptor {
        TransactionDescriptor::new(
            TransactionId::new(TARGET, 1),
            vec![
                Participant::new(TARGET, PersistenceState::Initiated),
                Participant::new(SOURCE, PersistenceState::Executed),
            ],
        )
        .unwrap()
    }

    fn setup() -> (Arc<MockEngine>, Notifier) {
        let engine = Arc::new(MockEngine::new());
        register_message_types(&engine).unwrap();
        let notifier = Notifier::new(MockClient::new(SOURCE, engine.clone()));
        (engine, notifier)
    }

    #[tokio::test]
    async fn test_notify_delivers_copy_of_descriptor() {
        let (engine, notifier) = setup();
        let mut endpoint = engine.register_endpoint(TARGET);
        let d = descriptor();

        notifier.notify(TARGET, MessageKind::Persistent, &d).unwrap();

        let delivery = endpoint.try_recv().unwrap();
        assert_eq!(delivery.source, SOURCE);
        let request = DtmRequest::from_message(delivery.message).unwrap();
        assert_eq!(request.kind, MessageKind::Persistent);
        assert_eq!(request.descriptor, d);
        assert!(endpoint.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_notify_unknown_target_fails_submission() {
        let (_engine, notifier) = setup();

        let err = notifier
            .notify(TARGET, MessageKind::Persistent, &descriptor())
            .unwrap_err();
        assert!(matches!(
            err,
            DtmError::SendSubmission {
                target: TARGET,
                source: MockEngineError::EndpointNotFound(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_notify_without_registered_types_fails_submission() {
        let engine = Arc::new(MockEngine::new());
        let _endpoint = engine.register_endpoint(TARGET);
        let notifier = Notifier::new(MockClient::new(SOURCE, engine));

        let err = notifier
            .notify(TARGET, MessageKind::Execute, &descriptor())
            .unwrap_err();
        assert!(matches!(
            err,
            DtmError::SendSubmission {
                source: MockEngineError::UnknownMessageType(DTM_REQUEST_OPCODE),
                ..
            }
        ));
    }

    #[test]
    fn test_observe_reply() {
        let ok = DtmReply::success().into_message().unwrap();
        assert_eq!(observe_reply(Ok(ok)).unwrap(), Some(DtmReply::success()));

        let failed = DtmReply::failure(ResultCode::EIO).into_message().unwrap();
        assert_eq!(
            observe_reply(Ok(failed)).unwrap().unwrap().result,
            ResultCode::EIO
        );

        assert_eq!(observe_reply(Err(MockEngineError::Timeout)).unwrap(), None);
    }

    #[test]
    fn test_observe_reply_outside_reply_family() {
        let request = DtmRequest::new(MessageKind::Persistent, descriptor())
            .into_message()
            .unwrap();

        assert!(matches!(
            observe_reply(Ok(request)),
            Err(DtmError::ReplyKindMismatch(DTM_REQUEST_OPCODE))
        ));
    }
}
