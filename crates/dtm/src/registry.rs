//! Per-process service registry

use crate::service::DtmService;
use parking_lot::RwLock;
use proven_common::NodeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Services known to one process, with the identity of its own service
#[derive(Clone)]
pub struct ServiceRegistry {
    local: NodeId,
    services: Arc<RwLock<HashMap<NodeId, Arc<DtmService>>>>,
}

impl ServiceRegistry {
    /// Create a registry for the process whose own service is `local`
    pub fn new(local: NodeId) -> Self {
        Self {
            local,
            services: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Identity of the local service
    pub fn local(&self) -> NodeId {
        self.local
    }

    /// Register a service, replacing any previous one with the same identity
    pub fn register(&self, service: Arc<DtmService>) {
        self.services.write().insert(service.identity(), service);
    }

    /// The service this process owns
    pub fn find_local_service(&self) -> Option<Arc<DtmService>> {
        self.find(self.local)
    }

    pub fn find(&self, identity: NodeId) -> Option<Arc<DtmService>> {
        self.services.read().get(&identity).cloned()
    }
}
