//! Locality run-loops driving processing tasks
//!
//! Every locality owns one run-loop that executes its tasks one at a time.
//! A dispatcher reads the service's endpoint, creates a task per delivery
//! and hands it to the locality the task was assigned to.

use crate::service::DtmService;
use crate::task::{DtmTask, TickResult};
use parking_lot::Mutex;
use proven_engine::{Delivery, Endpoint, ReplyHandle};
use proven_protocol::{DtmReply, DtmRequest, ResultCode};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Checks that run before a task is processed (credits, authorization)
pub trait Preamble: Send + Sync {
    fn check(&self, request: &DtmRequest) -> std::result::Result<(), ResultCode>;
}

/// Preamble that lets every request through
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Preamble for AllowAll {
    fn check(&self, _request: &DtmRequest) -> std::result::Result<(), ResultCode> {
        Ok(())
    }
}

/// A task waiting in a locality queue, with the way back to its sender
struct Job {
    task: DtmTask,
    reply: ReplyHandle,
}

/// Running scheduler of one service
pub struct Scheduler {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Start the run-loops and the dispatcher for `service`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(service: Arc<DtmService>, endpoint: Endpoint, preamble: Arc<dyn Preamble>) -> Self {
        let count = service.localities().count();
        let mut tasks = Vec::with_capacity(count + 1);
        let mut queues = Vec::with_capacity(count);

        for index in 0..count {
            let (tx, rx) = mpsc::unbounded_channel();
            queues.push(tx);
            tasks.push(tokio::spawn(run_locality(index, rx, preamble.clone())));
        }

        tasks.push(tokio::spawn(dispatch(service, endpoint, queues)));

        Self {
            tasks: Mutex::new(tasks),
        }
    }

    /// Stop the dispatcher and all run-loops
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn dispatch(
    service: Arc<DtmService>,
    mut endpoint: Endpoint,
    queues: Vec<mpsc::UnboundedSender<Job>>,
) {
    while let Some(delivery) = endpoint.recv().await {
        let Delivery {
            source,
            message,
            reply,
        } = delivery;

        match DtmTask::create(service.clone(), message) {
            Ok(task) => {
                let Some(queue) = queues.get(task.locality()) else {
                    tracing::error!("No run-loop for locality {}", task.locality());
                    send_reply(reply, DtmReply::failure(ResultCode::ENOMEM));
                    continue;
                };
                if queue.send(Job { task, reply }).is_err() {
                    tracing::warn!("Run-loop stopped, dropping message from {}", source);
                }
            }
            Err(e) => {
                tracing::warn!("Rejected message from {} at {}: {}", source, service.identity(), e);
                send_reply(reply, DtmReply::failure(e.result_code()));
            }
        }
    }

    tracing::debug!("Endpoint of {} closed", endpoint.node_id());
}

async fn run_locality(
    index: usize,
    mut queue: mpsc::UnboundedReceiver<Job>,
    preamble: Arc<dyn Preamble>,
) {
    while let Some(Job { mut task, reply }) = queue.recv().await {
        loop {
            match task.tick(preamble.as_ref()) {
                TickResult::Again => continue,
                TickResult::Wait => tokio::task::yield_now().await,
                TickResult::Terminate => break,
            }
        }
        tracing::trace!("Locality {} finished task in {:?}", index, task.phase());
        send_reply(reply, task.into_reply());
    }
}

fn send_reply(handle: ReplyHandle, reply: DtmReply) {
    match reply.into_message() {
        Ok(message) => {
            if handle.send(message).is_err() {
                tracing::debug!("Sender went away before the reply");
            }
        }
        Err(e) => tracing::error!("Failed to encode reply: {}", e),
    }
}
