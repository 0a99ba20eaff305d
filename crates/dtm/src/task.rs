//! Per-message processing task
//!
//! A task is created for every inbound request and driven by its locality's
//! run-loop through `tick`. The preamble checks run first; then a single
//! non-blocking processing step decides the reaction from the message kind
//! and the service role, and the task is done.

use crate::error::{DtmError, Result};
use crate::locality::LocalityIndex;
use crate::role::Role;
use crate::scheduler::Preamble;
use crate::service::DtmService;
use proven_engine::Message;
use proven_protocol::{DtmReply, DtmRequest, MessageKind, ResultCode};
use std::sync::Arc;

/// Terminal outcome of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(ResultCode),
}

/// Processing phase of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the preamble checks
    Preamble,
    /// Ready for the processing step
    Processing,
    /// Finished; the reply is final
    Done(Outcome),
}

/// What the run-loop should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// Tick again right away
    Again,
    /// Park until an external event wakes the task
    Wait,
    /// Task is finished and can be released
    Terminate,
}

/// Task processing one inbound persistence request
pub struct DtmTask {
    service: Arc<DtmService>,
    request: DtmRequest,
    reply: DtmReply,
    phase: Phase,
    locality: LocalityIndex,
}

impl DtmTask {
    /// Create a task for an inbound message
    ///
    /// Messages that do not parse as a request are rejected and no task is
    /// created.
    pub fn create(service: Arc<DtmService>, message: Message) -> Result<Self> {
        let request = DtmRequest::from_message(message)
            .map_err(|e| DtmError::TaskCreation(e.to_string()))?;
        let locality = service.localities().assign();

        Ok(Self {
            service,
            request,
            reply: DtmReply::success(),
            phase: Phase::Preamble,
            locality,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn request(&self) -> &DtmRequest {
        &self.request
    }

    pub fn reply(&self) -> &DtmReply {
        &self.reply
    }

    pub fn into_reply(self) -> DtmReply {
        self.reply
    }

    pub fn locality(&self) -> LocalityIndex {
        self.locality
    }

    /// Advance the task by one step
    pub fn tick(&mut self, preamble: &dyn Preamble) -> TickResult {
        match self.phase {
            Phase::Preamble => {
                match preamble.check(&self.request) {
                    Ok(()) => self.phase = Phase::Processing,
                    Err(code) => {
                        tracing::debug!(
                            "Preamble rejected {} for {} with {}",
                            self.request.kind,
                            self.request.descriptor.id(),
                            code
                        );
                        self.finish(Outcome::Failure(code));
                    }
                }
                TickResult::Again
            }
            Phase::Processing => {
                self.process();
                TickResult::Again
            }
            Phase::Done(_) => TickResult::Terminate,
        }
    }

    fn process(&mut self) {
        let service = &self.service;
        let kind = self.request.kind;
        let descriptor = &self.request.descriptor;

        tracing::debug!(
            "Processing {} for {} at {} ({})",
            kind,
            descriptor.id(),
            service.identity(),
            service.role()
        );

        let result = match (kind, service.role()) {
            (MessageKind::Execute, Role::PersistentParticipant) => service.notifier().notify(
                service.ack_target(descriptor),
                MessageKind::Persistent,
                descriptor,
            ),
            (MessageKind::Persistent, Role::VolatileParticipant) => service
                .log()
                .append_persistence_record(descriptor)
                .map_err(DtmError::from),
            _ => Ok(()),
        };

        match result {
            Ok(()) => self.finish(Outcome::Success),
            Err(e) => {
                tracing::error!(
                    "Failed to process {} for {} at {}: {}",
                    kind,
                    descriptor.id(),
                    service.identity(),
                    e
                );
                self.finish(Outcome::Failure(e.result_code()));
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.reply = match outcome {
            Outcome::Success => DtmReply::success(),
            Outcome::Failure(code) => DtmReply::failure(code),
        };
        self.phase = Phase::Done(outcome);
    }
}
