//! Persistence notification participant of the distributed transaction manager
//!
//! Nodes taking part in a transaction exchange persistence notices: a
//! persistent participant acknowledges an `Execute` by sending `Persistent`
//! to its acknowledgement target, and a volatile participant records every
//! `Persistent` it receives in the durable log. Once a confirmation must be
//! relayed, `on_persistent` marks the local participant persistent and tells
//! the transaction's originator.

mod config;
mod error;
mod locality;
mod notifier;
mod persistence;
mod registry;
mod role;
mod scheduler;
mod service;
mod task;

pub use config::{AckTarget, DtmConfig};
pub use error::{DtmError, Result};
pub use locality::{LocalityAssigner, LocalityIndex};
pub use notifier::{Notifier, observe_reply};
pub use persistence::on_persistent;
pub use registry::ServiceRegistry;
pub use role::Role;
pub use scheduler::{AllowAll, Preamble, Scheduler};
pub use service::DtmService;
pub use task::{DtmTask, Outcome, Phase, TickResult};
