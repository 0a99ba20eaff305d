//! Common test utilities for integration tests

use proven_common::{NodeId, Participant, PersistenceState, TransactionDescriptor, TransactionId};
use proven_dtm::{AckTarget, AllowAll, DtmConfig, DtmService, Preamble, Role, Scheduler, ServiceRegistry};
use proven_engine::{Endpoint, Message, MockClient, MockEngine};
use proven_log_memory::MemoryLog;
use proven_protocol::{DtmReply, DtmRequest, MessageKind, register_message_types};
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const ORIGINATOR: NodeId = NodeId::new(0x72, 1);
pub const PARTICIPANT: NodeId = NodeId::new(0x73, 1);
#[allow(dead_code)]
pub const OUTSIDER: NodeId = NodeId::new(0x74, 1);

static TRACING: Once = Once::new();

/// Install a fmt subscriber once, filtered by `PROVEN_DTM_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("PROVEN_DTM_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Engine with the persistence message types registered
pub fn engine() -> Arc<MockEngine> {
    init_tracing();
    let engine = Arc::new(MockEngine::new());
    register_message_types(&engine).unwrap();
    engine
}

/// `{id=(ORIGINATOR, seq), participants=[(ORIGINATOR, o), (PARTICIPANT, p)]}`
pub fn descriptor(seq: u64, o: PersistenceState, p: PersistenceState) -> TransactionDescriptor {
    TransactionDescriptor::new(
        TransactionId::new(ORIGINATOR, seq),
        vec![Participant::new(ORIGINATOR, o), Participant::new(PARTICIPANT, p)],
    )
    .unwrap()
}

pub fn request(kind: MessageKind, descriptor: &TransactionDescriptor) -> Message {
    DtmRequest::new(kind, descriptor.clone())
        .into_message()
        .unwrap()
}

/// A service together with its log and the endpoint nobody consumes yet
pub struct Node {
    pub service: Arc<DtmService>,
    pub log: Arc<MemoryLog>,
    pub registry: ServiceRegistry,
    pub endpoint: Option<Endpoint>,
}

impl Node {
    pub fn new(engine: &Arc<MockEngine>, identity: NodeId, role: Role, ack_target: AckTarget) -> Self {
        let config = DtmConfig::new(identity, role)
            .with_ack_target(ack_target)
            .with_localities(2);
        Self::with_config(engine, config)
    }

    pub fn with_config(engine: &Arc<MockEngine>, config: DtmConfig) -> Self {
        let identity = config.identity;
        let endpoint = engine.register_endpoint(identity);
        let log = Arc::new(MemoryLog::new());
        let service = Arc::new(
            DtmService::new(config, MockClient::new(identity, engine.clone()), log.clone()).unwrap(),
        );
        let registry = ServiceRegistry::new(identity);
        registry.register(service.clone());

        Self {
            service,
            log,
            registry,
            endpoint: Some(endpoint),
        }
    }

    /// Start serving the endpoint with the given preamble
    #[allow(dead_code)]
    pub fn start_with(&mut self, preamble: Arc<dyn Preamble>) -> Scheduler {
        let endpoint = self.endpoint.take().expect("node already started");
        Scheduler::start(self.service.clone(), endpoint, preamble)
    }

    #[allow(dead_code)]
    pub fn start(&mut self) -> Scheduler {
        self.start_with(Arc::new(AllowAll))
    }

    /// Take the next message queued for this node, if any
    #[allow(dead_code)]
    pub fn next_request(&mut self) -> Option<DtmRequest> {
        let endpoint = self.endpoint.as_mut()?;
        endpoint
            .try_recv()
            .map(|delivery| DtmRequest::from_message(delivery.message).unwrap())
    }
}

/// Send a request from `from` to `to` and wait for the reply
#[allow(dead_code)]
pub async fn send(engine: &Arc<MockEngine>, from: NodeId, to: NodeId, message: Message) -> DtmReply {
    let client = MockClient::new(from, engine.clone());
    let session = client.session(to).unwrap();
    let reply = client.request(&session, message, 1000).await.unwrap();
    DtmReply::from_message(reply).unwrap()
}

/// Wait for the next appended descriptor
#[allow(dead_code)]
pub async fn next_append(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<TransactionDescriptor>,
) -> TransactionDescriptor {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a log append")
        .expect("log subscription closed")
}
